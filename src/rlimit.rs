//! Open file limit tuning

/// File descriptors reserved on top of one socket per worker
#[cfg(unix)]
const RESERVED_FDS: u64 = 32;

/// Raise the soft `RLIMIT_NOFILE` so every worker can hold a connection
///
/// The new soft limit is `parallelism + 32`, clamped to the hard limit.
/// A limit that is already high enough is left alone.
#[cfg(unix)]
pub fn raise_nofile(parallelism: usize) -> std::io::Result<()> {
    use std::{io, mem};

    let target = (parallelism as u64).saturating_add(RESERVED_FDS) as libc::rlim_t;

    // SAFETY: `lim` is a valid, zero-initialised rlimit owned by this frame
    unsafe {
        let mut lim: libc::rlimit = mem::zeroed();
        if libc::getrlimit(libc::RLIMIT_NOFILE, &mut lim) != 0 {
            return Err(io::Error::last_os_error());
        }

        let new_soft = target.min(lim.rlim_max);
        if lim.rlim_cur >= new_soft {
            tracing::debug!(current = lim.rlim_cur as u64, "Open file limit already sufficient");
            return Ok(());
        }

        let previous = lim.rlim_cur;
        lim.rlim_cur = new_soft;
        if libc::setrlimit(libc::RLIMIT_NOFILE, &lim) != 0 {
            return Err(io::Error::last_os_error());
        }
        tracing::debug!(
            previous = previous as u64,
            current = new_soft as u64,
            "Raised open file limit"
        );
    }

    Ok(())
}

/// No-op where `RLIMIT_NOFILE` does not exist
#[cfg(not(unix))]
pub fn raise_nofile(_parallelism: usize) -> std::io::Result<()> {
    Ok(())
}
