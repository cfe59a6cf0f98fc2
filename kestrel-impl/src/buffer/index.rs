//! Index storage at a caller-chosen width, exposed as a uniform `u32`
//! iterator regardless of how the bytes are actually packed (spec §3
//! "Index Data").

use kestrel_core::{EngineError, EngineResult};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum IndexElementKind {
    U8,
    U16,
    U32,
}

impl IndexElementKind {
    fn size_bytes(self) -> usize {
        match self {
            IndexElementKind::U8 => 1,
            IndexElementKind::U16 => 2,
            IndexElementKind::U32 => 4,
        }
    }
}

#[derive(Clone)]
pub struct IndexData {
    kind: IndexElementKind,
    bytes: Vec<u8>,
    count: u32,
}

impl IndexData {
    pub fn new(kind: IndexElementKind) -> Self {
        Self {
            kind,
            bytes: Vec::new(),
            count: 0,
        }
    }

    pub fn kind(&self) -> IndexElementKind {
        self.kind
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Appends `index`, failing if it cannot be represented at this
    /// buffer's storage width.
    pub fn push(&mut self, index: u32) -> EngineResult<()> {
        match self.kind {
            IndexElementKind::U8 => {
                let v: u8 = index.try_into().map_err(|_| EngineError::BufferOverflow)?;
                self.bytes.push(v);
            }
            IndexElementKind::U16 => {
                let v: u16 = index.try_into().map_err(|_| EngineError::BufferOverflow)?;
                self.bytes.extend_from_slice(&v.to_le_bytes());
            }
            IndexElementKind::U32 => {
                self.bytes.extend_from_slice(&index.to_le_bytes());
            }
        }
        self.count += 1;
        Ok(())
    }

    /// Iterates every stored index widened to `u32`, regardless of storage
    /// width.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        let size = self.kind.size_bytes();
        self.bytes.chunks_exact(size).map(move |chunk| match self.kind {
            IndexElementKind::U8 => chunk[0] as u32,
            IndexElementKind::U16 => u16::from_le_bytes([chunk[0], chunk[1]]) as u32,
            IndexElementKind::U32 => u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]),
        })
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
        self.count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u8_storage_rejects_out_of_range_index() {
        let mut data = IndexData::new(IndexElementKind::U8);
        data.push(255).unwrap();
        assert!(matches!(data.push(256), Err(EngineError::BufferOverflow)));
    }

    #[test]
    fn iter_widens_regardless_of_storage_width() {
        let mut data = IndexData::new(IndexElementKind::U16);
        for i in [0u32, 1, 65000] {
            data.push(i).unwrap();
        }
        let collected: Vec<u32> = data.iter().collect();
        assert_eq!(collected, vec![0, 1, 65000]);
    }

    #[test]
    fn u32_storage_roundtrips_large_indices() {
        let mut data = IndexData::new(IndexElementKind::U32);
        data.push(1_000_000).unwrap();
        assert_eq!(data.iter().next(), Some(1_000_000));
    }
}
