use log::error;

use crate::common::errors::HybError;
use crate::core::codec::{GapMode, ListCodec, ListKind};
use crate::core::common::BlockId;

/// Decompress-and-compare check run right after a list was compressed.
///
/// Enabled by default in debug builds; `BuildConfig::verify_round_trip`
/// switches it on or off independently of the build profile.
#[derive(Debug, Clone)]
pub struct RoundTripVerifier {
    enabled: bool,
    lists_checked: u64,
}

impl RoundTripVerifier {
    pub fn new(enabled: bool) -> Self {
        Self { enabled, lists_checked: 0 }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn lists_checked(&self) -> u64 {
        self.lists_checked
    }

    pub fn check(
        &mut self,
        codec: &dyn ListCodec,
        list: ListKind,
        block: BlockId,
        original: &[u32],
        compressed: &[u8],
        mode: GapMode,
    ) -> Result<(), HybError> {
        if !self.enabled {
            return Ok(());
        }
        self.lists_checked += 1;
        match codec.decompress(compressed, original.len(), mode) {
            Ok(decoded) if decoded == original => Ok(()),
            Ok(decoded) => {
                let index = decoded.iter().zip(original).position(|(a, b)| a != b).unwrap_or(decoded.len());
                error!(
                    "[RoundTripVerifier] {} list of block {} differs at index {} after codec '{}'",
                    list,
                    block,
                    index,
                    codec.name()
                );
                Err(HybError::CodecInvariant { list, block })
            }
            Err(e) => {
                error!("[RoundTripVerifier] {} list of block {} can't be decompressed: {}", list, block, e);
                Err(HybError::CodecInvariant { list, block })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::codec::{CodecError, DocListCodec};

    /// Drops the last value of every list it compresses.
    struct LossyCodec;

    impl ListCodec for LossyCodec {
        fn name(&self) -> &'static str {
            "lossy"
        }

        fn compress_into(&self, values: &[u32], mode: GapMode, out: &mut Vec<u8>) -> Result<usize, CodecError> {
            let kept = &values[..values.len().saturating_sub(1)];
            DocListCodec.compress_into(kept, mode, out)
        }

        fn decompress(&self, bytes: &[u8], count: usize, mode: GapMode) -> Result<Vec<u32>, CodecError> {
            DocListCodec.decompress(bytes, count.saturating_sub(1), mode)
        }
    }

    #[test]
    fn test_accepts_faithful_codec() {
        let mut verifier = RoundTripVerifier::new(true);
        assert!(verifier.is_enabled());
        let values = vec![1, 2, 2, 9];
        let bytes = DocListCodec.compress(&values, GapMode::Gaps).unwrap();
        verifier.check(&DocListCodec, ListKind::Doc, 0, &values, &bytes, GapMode::Gaps).unwrap();
        assert_eq!(verifier.lists_checked(), 1);
    }

    #[test]
    fn test_rejects_lossy_codec() {
        let mut verifier = RoundTripVerifier::new(true);
        let values = vec![1, 2, 3];
        let bytes = LossyCodec.compress(&values, GapMode::Gaps).unwrap();
        let result = verifier.check(&LossyCodec, ListKind::Doc, 4, &values, &bytes, GapMode::Gaps);
        assert!(matches!(result, Err(HybError::CodecInvariant { list: ListKind::Doc, block: 4 })));
    }

    #[test]
    fn test_disabled_skips_check() {
        let mut verifier = RoundTripVerifier::new(false);
        assert!(!verifier.is_enabled());
        let values = vec![1, 2, 3];
        let bytes = LossyCodec.compress(&values, GapMode::Gaps).unwrap();
        verifier.check(&LossyCodec, ListKind::Doc, 0, &values, &bytes, GapMode::Gaps).unwrap();
        assert_eq!(verifier.lists_checked(), 0);
    }
}
