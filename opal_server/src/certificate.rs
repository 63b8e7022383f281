//! Server certificate loading.

use std::path::Path;

use tracing::{info, warn};

/// Load the DER-encoded server certificate.
///
/// The certificate is optional: a missing or unreadable file yields an
/// empty buffer, never an error, and the server starts unencrypted.
pub fn load_certificate(path: &Path) -> Vec<u8> {
    match std::fs::read(path) {
        Ok(bytes) => {
            info!(path = %path.display(), len = bytes.len(), "server certificate loaded");
            bytes
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "no server certificate, continuing without");
            Vec::new()
        }
        Err(e) => {
            warn!(path = %path.display(), "failed to read server certificate: {e}");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn missing_certificate_is_empty_not_error() {
        let dir = TempDir::new().unwrap();
        let cert = load_certificate(&dir.path().join("server_cert.der"));
        assert!(cert.is_empty());
    }

    #[test]
    fn existing_certificate_read_wholesale() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("server_cert.der");
        fs::write(&path, [0x30, 0x82, 0x01, 0x0a]).unwrap();

        let cert = load_certificate(&path);
        assert_eq!(cert, vec![0x30, 0x82, 0x01, 0x0a]);
    }
}
