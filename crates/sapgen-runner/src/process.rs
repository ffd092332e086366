//! Generator process group control.
//!
//! The generator is started as the leader of its own process group, so any
//! helpers it spawns share that group and can be signalled together.

/// Sends `SIGKILL` to every process in the group led by `pid`.
///
/// A group that no longer exists is ignored.
#[cfg(unix)]
#[allow(unsafe_code)]
pub fn kill_group(pid: u32) {
    let Ok(pgid) = libc::pid_t::try_from(pid) else {
        return;
    };
    // 0 and negative ids address the caller's own group
    if pgid <= 0 {
        return;
    }

    // SAFETY: killpg only takes integer arguments
    let rc = unsafe { libc::killpg(pgid, libc::SIGKILL) };
    if rc != 0 {
        let err = std::io::Error::last_os_error();
        if err.raw_os_error() != Some(libc::ESRCH) {
            tracing::warn!(pgid, error = %err, "Failed to kill generator process group");
        }
    }
}

/// Process groups are a unix concept; the direct child is still killed on drop.
#[cfg(not(unix))]
pub const fn kill_group(_pid: u32) {}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::process::ExitStatusExt;
    use std::process::Stdio;

    #[tokio::test]
    async fn test_kill_group_stops_leader() {
        let mut child = tokio::process::Command::new("/bin/sh")
            .args(["-c", "sleep 30 & wait"])
            .stdout(Stdio::null())
            .process_group(0)
            .kill_on_drop(true)
            .spawn()
            .unwrap();

        kill_group(child.id().unwrap());
        let status = child.wait().await.unwrap();
        assert_eq!(status.signal(), Some(libc::SIGKILL));
    }

    #[test]
    fn test_missing_group_is_ignored() {
        kill_group(u32::MAX);
        kill_group(0);
    }
}
