//! Default configuration values

/// Build output directory, relative to the target root
pub const DEFAULT_OUTPUT_DIR: &str = "out";

/// Kernel `ARCH` of the deployment board
pub const DEFAULT_DEPLOYMENT_ARCH: &str = "arm64";

/// Cross-compile prefix used when none is given with `-t`
pub const DEFAULT_CROSS_COMPILE: &str = "aarch64-linux-gnu-";

/// Busybox install staging directory, relative to the output directory
pub const DEFAULT_STAGING_DIR: &str = "_install";

/// Root filesystem image, relative to the output directory
pub const DEFAULT_IMAGE: &str = "rootfs.img";

/// Root filesystem image size in MiB
pub const DEFAULT_IMAGE_SIZE_MB: u64 = 64;

/// Scratch mount point used while populating the image
pub const DEFAULT_MOUNT_POINT: &str = "/tmp/kbox-rootfs";

/// Filesystem the image is formatted with (`mkfs.<fs_type>`)
pub const DEFAULT_FS_TYPE: &str = "ext4";

/// Wrapper for the mount, copy and unmount steps
pub const DEFAULT_PRIVILEGE_COMMAND: &str = "sudo";

/// Source file extensions collected for indexing
pub const DEFAULT_INDEX_EXTENSIONS: &[&str] = &["c", "h", "S", "s", "cpp", "cc", "hpp"];
