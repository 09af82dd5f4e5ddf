//! Transport codec: [`LogicalNode`] to compressed bytes and back.
//!
//! A tree is projected onto its [`EncodedNode`] form, written with borsh and
//! compressed as a single zstd frame. Decoding reverses the steps and never
//! trusts the blob: the decompressed size, the nesting depth and the set of
//! wire tags are all bounded, and bytes left over after the root node are an
//! error.
use std::io::{self, Read};

use log::{debug, trace};

use crate::{
    encoding::{DepthLimit, EncodedNode, UnknownTag},
    node::LogicalNode,
    utils::error::{BetResult, Error},
};

mod config;

pub use config::{CodecConfig, ENV_CODEC_CONFIG_PATH};

#[derive(Debug, Clone, Default)]
pub struct Codec {
    config: CodecConfig,
}

impl Codec {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Serializes `tree` to a self-contained compressed blob.
    ///
    /// Trees this codec would refuse to read back (too deep, or too large once
    /// decompressed) are rejected here with the same error.
    pub fn serialize(&self, tree: &LogicalNode) -> BetResult<Vec<u8>> {
        let max_depth = self.config.max_depth;
        if tree.depth() > max_depth {
            debug!("Refusing to serialize a tree deeper than {max_depth}");
            return Err(Error::DepthExceeded { max: max_depth });
        }

        let encoded = tree.encode();
        let raw = borsh::to_vec(&encoded).map_err(Error::Encoding)?;

        let limit = self.config.max_decoded_bytes;
        if raw.len() > limit {
            debug!("Refusing to serialize {} bytes, limit is {limit}", raw.len());
            return Err(Error::PayloadTooLarge { limit });
        }

        let compressed = zstd::stream::encode_all(raw.as_slice(), self.config.compression_level)
            .map_err(Error::Encoding)?;

        debug!(
            "Serialized tree ({} leaves) into {} bytes ({} before compression)",
            tree.leaf_count(),
            compressed.len(),
            raw.len()
        );
        Ok(compressed)
    }

    /// Decodes a blob produced by [`Codec::serialize`] into its wire form.
    pub fn deserialize_encoded(&self, bytes: &[u8]) -> BetResult<EncodedNode> {
        trace!("Deserializing payload ({} bytes)", bytes.len());
        let raw = self.decompress(bytes)?;

        let mut cursor = raw.as_slice();
        let node = EncodedNode::deserialize_bounded(&mut cursor, self.config.max_depth)
            .map_err(|e| self.classify(e))?;

        if !cursor.is_empty() {
            debug!("Payload has {} trailing bytes", cursor.len());
            return Err(Error::MalformedPayload(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{} trailing bytes after the root node", cursor.len()),
            )));
        }

        Ok(node)
    }

    /// Inverse of [`Codec::serialize`].
    pub fn deserialize(&self, bytes: &[u8]) -> BetResult<LogicalNode> {
        self.deserialize_encoded(bytes).map(EncodedNode::decode)
    }

    fn decompress(&self, bytes: &[u8]) -> BetResult<Vec<u8>> {
        let limit = self.config.max_decoded_bytes;
        let decoder = zstd::stream::read::Decoder::new(bytes).map_err(Error::Decompression)?;

        // One byte past the limit is enough to tell that the limit was crossed.
        let mut raw = Vec::new();
        decoder
            .take(limit as u64 + 1)
            .read_to_end(&mut raw)
            .map_err(|e| {
                debug!("Failed to decompress payload: {e}");
                Error::Decompression(e)
            })?;

        if raw.len() > limit {
            debug!("Decompressed payload exceeds {limit} bytes");
            return Err(Error::PayloadTooLarge { limit });
        }

        trace!("Decompressed payload to {} bytes", raw.len());
        Ok(raw)
    }

    fn classify(&self, error: io::Error) -> Error {
        debug!("Rejected payload: {error}");
        if let Some(inner) = error.get_ref() {
            if let Some(UnknownTag(tag)) = inner.downcast_ref::<UnknownTag>() {
                return Error::UnknownVariant { tag: *tag };
            }
            if inner.is::<DepthLimit>() {
                return Error::DepthExceeded {
                    max: self.config.max_depth,
                };
            }
        }
        Error::MalformedPayload(error)
    }
}

/// [`Codec::serialize`] with the default configuration.
pub fn serialize(tree: &LogicalNode) -> BetResult<Vec<u8>> {
    Codec::default().serialize(tree)
}

/// [`Codec::deserialize`] with the default configuration.
pub fn deserialize(bytes: &[u8]) -> BetResult<LogicalNode> {
    Codec::default().deserialize(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        encoding::magic,
        node::{and, eq, gt, not, or},
    };

    fn compress(raw: &[u8]) -> Vec<u8> {
        zstd::stream::encode_all(raw, 0).unwrap()
    }

    #[test]
    fn round_trip_preserves_the_tree() {
        let tree = or(and(eq("val1", "1"), not(gt("val2", 10))), eq("val3", -7));
        let bytes = serialize(&tree).unwrap();
        assert_eq!(deserialize(&bytes).unwrap(), tree);
    }

    #[test]
    fn compression_level_does_not_change_the_tree() {
        let tree = and(eq("a", "x".repeat(256).as_str()), eq("b", 1));
        let fast = Codec::new(CodecConfig {
            compression_level: 1,
            ..Default::default()
        });
        let strong = Codec::new(CodecConfig {
            compression_level: 19,
            ..Default::default()
        });

        assert_eq!(fast.deserialize(&strong.serialize(&tree).unwrap()).unwrap(), tree);
        assert_eq!(strong.deserialize(&fast.serialize(&tree).unwrap()).unwrap(), tree);
    }

    #[test]
    fn unknown_tag_is_reported() {
        let err = deserialize(&compress(&[0x7f])).unwrap_err();
        assert!(matches!(err, Error::UnknownVariant { tag: 0x7f }));
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut raw = borsh::to_vec(&eq("a", 1).encode()).unwrap();
        raw.push(0);
        assert!(deserialize(&compress(&raw)).unwrap_err().is_malformed_payload());
    }

    #[test]
    fn depth_limit_follows_config() {
        let tree = not(not(not(eq("a", 1))));
        let bytes = serialize(&tree).unwrap();

        let shallow = Codec::new(CodecConfig {
            max_depth: 3,
            ..Default::default()
        });
        assert!(matches!(
            shallow.deserialize(&bytes).unwrap_err(),
            Error::DepthExceeded { max: 3 }
        ));

        let exact = Codec::new(CodecConfig {
            max_depth: 4,
            ..Default::default()
        });
        assert_eq!(exact.deserialize(&bytes).unwrap(), tree);
    }

    #[test]
    fn serialize_refuses_what_deserialize_would_reject() {
        let tree = not(not(not(eq("a", 1))));
        let shallow = Codec::new(CodecConfig {
            max_depth: 3,
            ..Default::default()
        });
        assert!(matches!(
            shallow.serialize(&tree).unwrap_err(),
            Error::DepthExceeded { max: 3 }
        ));

        let small = Codec::new(CodecConfig {
            max_decoded_bytes: 1024,
            ..Default::default()
        });
        let wide = eq("key", "v".repeat(4096));
        assert!(matches!(
            small.serialize(&wide).unwrap_err(),
            Error::PayloadTooLarge { limit: 1024 }
        ));
        let narrow = eq("key", "v");
        let bytes = small.serialize(&narrow).unwrap();
        assert_eq!(small.deserialize(&bytes).unwrap(), narrow);
    }

    #[test]
    fn decompressed_size_is_bounded() {
        let tree = eq("key", "v".repeat(4096).as_str());
        let bytes = serialize(&tree).unwrap();
        let codec = Codec::new(CodecConfig {
            max_decoded_bytes: 1024,
            ..Default::default()
        });
        assert!(matches!(
            codec.deserialize(&bytes).unwrap_err(),
            Error::PayloadTooLarge { limit: 1024 }
        ));
    }

    #[test]
    fn garbage_is_not_a_compressed_stream() {
        let err = deserialize(b"definitely not zstd").unwrap_err();
        assert!(err.is_decompression());
    }

    #[test]
    fn invalid_utf8_key_is_malformed() {
        let raw = [magic::C_EQ_INT, 1, 0, 0, 0, 0xff, 1, 0, 0, 0, 0, 0, 0, 0];
        assert!(deserialize(&compress(&raw)).unwrap_err().is_malformed_payload());
    }
}
