use sha2::{Digest, Sha256};
use std::{fs, path::Path};

use crate::error::AdapterError;
use crate::report::model::{SourceHash, SourceInfo};

/// Raw source context used during analysis.
///
/// Holds the exact bytes handed to the front-end and a fingerprint
/// that identifies them in the report.
#[derive(Debug, Clone)]
pub struct SourceContext {
    /// Path as given on the command line.
    pub path: String,

    /// Exact bytes read from disk.
    pub bytes: Vec<u8>,

    pub size_bytes: u64,

    pub hash_alg: String,

    /// Hex-encoded hash of the source bytes.
    pub hash_hex: String,
}

impl SourceContext {
    /// Report-facing metadata; raw bytes are dropped.
    pub fn to_info(&self) -> SourceInfo {
        SourceInfo {
            path: Some(self.path.clone()),
            size_bytes: self.size_bytes,
            hash: SourceHash {
                algorithm: self.hash_alg.clone(),
                value: self.hash_hex.clone(),
            },
        }
    }
}

/// Read a contract source (or precompiled AST) and fingerprint it.
///
/// The identity depends only on the file bytes, never on filesystem metadata.
pub fn read_source(path: &Path) -> Result<SourceContext, AdapterError> {
    let bytes = fs::read(path).map_err(|source| AdapterError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let digest = Sha256::digest(&bytes);

    Ok(SourceContext {
        path: path.display().to_string(),
        size_bytes: bytes.len() as u64,
        bytes,
        hash_alg: "sha256".to_string(),
        hash_hex: hex::encode(digest),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_source(data: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(data).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn reads_bytes_and_computes_stable_hash() {
        let file = temp_source(b"ercscope-test");

        let ctx = read_source(file.path()).expect("source read succeeds");

        assert_eq!(ctx.bytes, b"ercscope-test");
        assert_eq!(ctx.size_bytes, 13);
        assert_eq!(ctx.hash_alg, "sha256");

        // echo -n "ercscope-test" | sha256sum
        assert_eq!(
            ctx.hash_hex,
            "8c1684db6d17d08c96fb384343549c9566014bc7dcf5f03814fac2bd60219a10"
        );
    }

    #[test]
    fn different_inputs_produce_different_hashes() {
        let a = read_source(temp_source(b"contract A {}").path()).unwrap();
        let b = read_source(temp_source(b"contract B {}").path()).unwrap();

        assert_ne!(a.hash_hex, b.hash_hex);
    }

    #[test]
    fn missing_file_is_an_io_adapter_error() {
        let err = read_source(Path::new("non_existent.sol")).unwrap_err();
        assert!(matches!(err, AdapterError::Io { .. }));
    }

    #[test]
    fn converts_to_report_source_info() {
        let ctx = SourceContext {
            path: "Token.sol".into(),
            bytes: b"pragma".to_vec(),
            size_bytes: 6,
            hash_alg: "sha256".into(),
            hash_hex: "abcd".into(),
        };

        let info = ctx.to_info();
        assert_eq!(info.path, Some("Token.sol".into()));
        assert_eq!(info.hash.value, "abcd");
        assert_eq!(info.size_bytes, 6);
    }
}
