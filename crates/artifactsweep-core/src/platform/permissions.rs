/// Elevation checks, used to explain access-denied failures.
///
/// On Windows a file held by a service or owned by another account often
/// only yields to an elevated process; on other platforms no hint is given.
use std::io;

/// Check whether the current process is running with elevated (admin) privileges.
#[cfg(windows)]
pub fn is_elevated() -> bool {
    use windows::Win32::Foundation::{CloseHandle, HANDLE};
    use windows::Win32::Security::{
        GetTokenInformation, TokenElevation, TOKEN_ELEVATION, TOKEN_QUERY,
    };
    use windows::Win32::System::Threading::{GetCurrentProcess, OpenProcessToken};

    unsafe {
        let mut token = HANDLE::default();
        if OpenProcessToken(GetCurrentProcess(), TOKEN_QUERY, &mut token).is_err() {
            return false;
        }

        let mut elevation = TOKEN_ELEVATION::default();
        let mut returned = 0u32;
        let queried = GetTokenInformation(
            token,
            TokenElevation,
            Some(&mut elevation as *mut _ as *mut _),
            std::mem::size_of::<TOKEN_ELEVATION>() as u32,
            &mut returned,
        );
        let _ = CloseHandle(token);

        queried.is_ok() && elevation.TokenIsElevated != 0
    }
}

/// Elevation is a Windows concept; elsewhere this is always `false`.
#[cfg(not(windows))]
pub fn is_elevated() -> bool {
    false
}

/// A short suggestion to print next to a failed delete, if one applies.
pub fn permission_hint(cause: &io::Error) -> Option<&'static str> {
    if cfg!(windows) && cause.kind() == io::ErrorKind::PermissionDenied && !is_elevated() {
        Some("close any program using it, or run ArtifactSweep from an elevated prompt")
    } else {
        None
    }
}
