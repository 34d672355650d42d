//! Synthetic FAT12 images for the integration tests.
//!
//! The geometry is the one of a 1.44MB floppy: 512 bytes per sector, 1 sector per cluster,
//! 1 reserved sector, 2 FATs of 9 sectors and 224 root directory entries. Only the first
//! `DATA_CLUSTERS` clusters of the data region are present in the image.

#![allow(dead_code)]

pub const SECTOR_SIZE: usize = 512;
pub const FAT_OFFSET: usize = 512;
pub const FAT_SIZE: usize = 9 * SECTOR_SIZE;
pub const ROOT_DIR_OFFSET: usize = 9728;
pub const DATA_OFFSET: usize = 16896;
pub const DATA_CLUSTERS: usize = 16;

pub struct Fat12Image {
    bytes: Vec<u8>,
}

impl Fat12Image {
    /// A formatted, empty volume.
    pub fn new() -> Self {
        let mut bytes = vec![0u8; DATA_OFFSET + DATA_CLUSTERS * SECTOR_SIZE];

        let bpb = &mut bytes[..SECTOR_SIZE];
        bpb[0..3].copy_from_slice(&[0xEB, 0x3C, 0x90]);
        bpb[3..11].copy_from_slice(b"MSDOS5.0");
        bpb[11..13].copy_from_slice(&512u16.to_le_bytes());
        bpb[13] = 1;
        bpb[14..16].copy_from_slice(&1u16.to_le_bytes());
        bpb[16] = 2;
        bpb[17..19].copy_from_slice(&224u16.to_le_bytes());
        bpb[19..21].copy_from_slice(&2880u16.to_le_bytes());
        bpb[21] = 0xF0;
        bpb[22..24].copy_from_slice(&9u16.to_le_bytes());
        bpb[24..26].copy_from_slice(&18u16.to_le_bytes());
        bpb[26..28].copy_from_slice(&2u16.to_le_bytes());
        bpb[38] = 0x29;
        bpb[43..54].copy_from_slice(b"TEST VOLUME");
        bpb[54..62].copy_from_slice(b"FAT12   ");
        bpb[510] = 0x55;
        bpb[511] = 0xAA;

        let mut image = Fat12Image { bytes };
        image.set_fat_entry(0, 0xFF0);
        image.set_fat_entry(1, 0xFFF);
        image
    }

    /// Writes a 12-bit entry in both FAT copies.
    pub fn set_fat_entry(&mut self, cluster: u16, value: u16) -> &mut Self {
        for copy in 0..2 {
            let base = FAT_OFFSET + copy * FAT_SIZE;
            let idx = base + usize::from(cluster) * 3 / 2;
            if cluster % 2 == 0 {
                self.bytes[idx] = (value & 0xFF) as u8;
                self.bytes[idx + 1] = (self.bytes[idx + 1] & 0xF0) | ((value >> 8) & 0x0F) as u8;
            } else {
                self.bytes[idx] = (self.bytes[idx] & 0x0F) | ((value & 0x0F) << 4) as u8;
                self.bytes[idx + 1] = (value >> 4) as u8;
            }
        }
        self
    }

    /// Links `clusters` into a chain ended by 0xFFF.
    pub fn link(&mut self, clusters: &[u16]) -> &mut Self {
        for pair in clusters.windows(2) {
            self.set_fat_entry(pair[0], pair[1]);
        }
        if let Some(last) = clusters.last() {
            self.set_fat_entry(*last, 0xFFF);
        }
        self
    }

    /// Writes a root directory entry in `slot`.
    pub fn set_dir_entry(
        &mut self,
        slot: usize,
        name: &[u8; 8],
        ext: &[u8; 3],
        cluster: u16,
        size: u32,
    ) -> &mut Self {
        let off = ROOT_DIR_OFFSET + slot * 32;
        let entry = &mut self.bytes[off..off + 32];
        entry.fill(0);
        entry[0..8].copy_from_slice(name);
        entry[8..11].copy_from_slice(ext);
        entry[11] = 0x20;
        entry[26..28].copy_from_slice(&cluster.to_le_bytes());
        entry[28..32].copy_from_slice(&size.to_le_bytes());
        self
    }

    /// Fills cluster `cluster` with `data`, padding with `fill`.
    pub fn write_cluster(&mut self, cluster: u16, data: &[u8], fill: u8) -> &mut Self {
        assert!(data.len() <= SECTOR_SIZE);
        let off = DATA_OFFSET + (usize::from(cluster) - 2) * SECTOR_SIZE;
        let buf = &mut self.bytes[off..off + SECTOR_SIZE];
        buf.fill(fill);
        buf[..data.len()].copy_from_slice(data);
        self
    }

    /// Stores `data` in `clusters`, links them and adds the directory entry.
    pub fn add_file(
        &mut self,
        slot: usize,
        name: &[u8; 8],
        ext: &[u8; 3],
        clusters: &[u16],
        data: &[u8],
    ) -> &mut Self {
        for (cluster, chunk) in clusters.iter().zip(data.chunks(SECTOR_SIZE)) {
            self.write_cluster(*cluster, chunk, 0);
        }
        self.link(clusters);
        let first = clusters.first().copied().unwrap_or(0);
        self.set_dir_entry(slot, name, ext, first, data.len() as u32)
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }
}

/// Deterministic file content.
pub fn pattern(len: usize, seed: u8) -> Vec<u8> {
    (0..len)
        .map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed))
        .collect()
}
