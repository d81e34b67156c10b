/// Read-only attribute clearing, done before every delete attempt.
///
/// - **Windows:** `READONLY`, `SYSTEM` and `HIDDEN` are dropped together via
///   `SetFileAttributesW`. `DeleteFileW` refuses read-only files and
///   `RemoveDirectoryW` refuses read-only directories.
/// - **Unix:** unlinking ignores the file's own mode but needs write access
///   to the containing directory, so files get the owner write bit and
///   directories get owner read/write/execute.
///
/// Symlinks are never touched: changing them would change their target.
use std::fs::Metadata;
use std::io;
use std::path::Path;

/// Clear whatever would stop `path` (or its entries) from being deleted.
///
/// Returns `true` only if `READONLY` was among the dropped attributes; a
/// merely hidden or system file is cleared silently.
#[cfg(windows)]
pub fn clear_read_only(path: &Path, metadata: &Metadata) -> io::Result<bool> {
    use std::os::windows::ffi::OsStrExt;
    use std::os::windows::fs::MetadataExt;
    use windows::core::PCWSTR;
    use windows::Win32::Storage::FileSystem::{
        SetFileAttributesW, FILE_ATTRIBUTE_DIRECTORY, FILE_ATTRIBUTE_HIDDEN,
        FILE_ATTRIBUTE_NORMAL, FILE_ATTRIBUTE_READONLY, FILE_ATTRIBUTE_SYSTEM,
        FILE_FLAGS_AND_ATTRIBUTES,
    };

    const BLOCKING: u32 =
        FILE_ATTRIBUTE_READONLY.0 | FILE_ATTRIBUTE_SYSTEM.0 | FILE_ATTRIBUTE_HIDDEN.0;

    if metadata.file_type().is_symlink() {
        return Ok(false);
    }

    let attributes = metadata.file_attributes();
    if attributes & BLOCKING == 0 {
        return Ok(false);
    }

    // SetFileAttributesW rejects the DIRECTORY flag; zero means "normal".
    let mut remaining = attributes & !BLOCKING & !FILE_ATTRIBUTE_DIRECTORY.0;
    if remaining == 0 {
        remaining = FILE_ATTRIBUTE_NORMAL.0;
    }

    let wide: Vec<u16> = path
        .as_os_str()
        .encode_wide()
        .chain(std::iter::once(0))
        .collect();

    unsafe {
        SetFileAttributesW(
            PCWSTR(wide.as_ptr()),
            FILE_FLAGS_AND_ATTRIBUTES(remaining),
        )
    }
    .map_err(|_| io::Error::last_os_error())?;

    Ok(attributes & FILE_ATTRIBUTE_READONLY.0 != 0)
}

/// Clear whatever would stop `path` (or its entries) from being deleted.
///
/// Returns `true` if the mode was actually changed.
#[cfg(unix)]
pub fn clear_read_only(path: &Path, metadata: &Metadata) -> io::Result<bool> {
    use std::os::unix::fs::PermissionsExt;

    if metadata.file_type().is_symlink() {
        return Ok(false);
    }

    let mode = metadata.permissions().mode();
    let wanted = if metadata.is_dir() {
        mode | 0o700
    } else {
        mode | 0o200
    };
    if wanted == mode {
        return Ok(false);
    }

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(wanted))?;
    Ok(true)
}

/// Clear whatever would stop `path` from being deleted.
#[cfg(not(any(unix, windows)))]
pub fn clear_read_only(path: &Path, metadata: &Metadata) -> io::Result<bool> {
    if metadata.file_type().is_symlink() || !metadata.permissions().readonly() {
        return Ok(false);
    }
    let mut permissions = metadata.permissions();
    #[allow(clippy::permissions_set_readonly_false)]
    permissions.set_readonly(false);
    std::fs::set_permissions(path, permissions)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn make_read_only(path: &Path) {
        let mut perms = fs::metadata(path).unwrap().permissions();
        perms.set_readonly(true);
        fs::set_permissions(path, perms).unwrap();
    }

    #[test]
    fn read_only_file_is_made_writable() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("App.csproj.user");
        fs::write(&file, b"<Project/>").unwrap();
        make_read_only(&file);

        let meta = fs::symlink_metadata(&file).unwrap();
        assert!(clear_read_only(&file, &meta).unwrap());
        assert!(!fs::metadata(&file).unwrap().permissions().readonly());
    }

    #[test]
    fn writable_file_is_left_alone() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("plain.txt");
        fs::write(&file, b"x").unwrap();

        let meta = fs::symlink_metadata(&file).unwrap();
        assert!(!clear_read_only(&file, &meta).unwrap());
    }

    #[test]
    fn read_only_directory_is_made_writable() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("obj");
        fs::create_dir(&dir).unwrap();
        make_read_only(&dir);

        let meta = fs::symlink_metadata(&dir).unwrap();
        assert!(clear_read_only(&dir, &meta).unwrap());
        assert!(!fs::metadata(&dir).unwrap().permissions().readonly());
    }

    #[cfg(windows)]
    #[test]
    fn hidden_file_is_cleared_without_counting_as_read_only() {
        use std::os::windows::ffi::OsStrExt;
        use std::os::windows::fs::MetadataExt;
        use windows::core::PCWSTR;
        use windows::Win32::Storage::FileSystem::{
            SetFileAttributesW, FILE_ATTRIBUTE_HIDDEN, FILE_ATTRIBUTE_SYSTEM,
        };

        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("Thumbs.user");
        fs::write(&file, b"x").unwrap();
        let wide: Vec<u16> = file
            .as_os_str()
            .encode_wide()
            .chain(std::iter::once(0))
            .collect();
        unsafe {
            SetFileAttributesW(
                PCWSTR(wide.as_ptr()),
                FILE_ATTRIBUTE_HIDDEN | FILE_ATTRIBUTE_SYSTEM,
            )
        }
        .unwrap();

        let meta = fs::symlink_metadata(&file).unwrap();
        assert!(!clear_read_only(&file, &meta).unwrap());
        let left = fs::metadata(&file).unwrap().file_attributes();
        assert_eq!(left & (FILE_ATTRIBUTE_HIDDEN.0 | FILE_ATTRIBUTE_SYSTEM.0), 0);
    }
}
