//! Cluster chain traversal and file extraction.
//!
//! A file's data is spread over a chain of clusters: the directory entry gives the first one,
//! the FAT gives each successor. [`ClusterChain`] walks the cluster numbers and
//! [`ClusterStream`] reads the data of each cluster lazily.

use log::{trace, warn};

use super::bpb::Bpb;
use super::fat_error::FATError;
use super::fat_table::{FatTable, is_chain_end};
use crate::traits::VolumeReader;
use crate::utils;

/// Byte address of `cluster` in the image.
///
/// Cluster 2 is the first cluster of the data region, which starts after the root directory.
///
/// # Errors
/// - `FATError::InvalidCluster` for clusters 0 and 1, which hold no data
pub fn cluster_address(bpb: &Bpb, volume_offset: u64, cluster: u16) -> Result<u64, FATError> {
    if cluster < 2 {
        return Err(FATError::InvalidCluster(cluster));
    }

    Ok(volume_offset
        + bpb.data_region_start()
        + u64::from(cluster - 2) * bpb.cluster_size() as u64)
}

/// Traversal state of a cluster chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    /// Nothing visited yet
    Start,
    /// The given cluster was the last one yielded
    InChain(u16),
    /// A terminal marker was reached
    Done,
    /// A failure was reported, nothing more will be yielded
    Error,
}

/// Lazy iterator over the cluster numbers of a chain.
///
/// The chain ends on a FAT value of 0 or at least 0xFF6. A failed lookup is yielded once and
/// ends the iteration.
#[derive(Debug, Clone)]
pub struct ClusterChain<'a> {
    fat: &'a FatTable,
    start: u16,
    state: ChainState,
    visited: usize,
}

impl<'a> ClusterChain<'a> {
    pub fn new(fat: &'a FatTable, start: u16) -> Self {
        ClusterChain {
            fat,
            start,
            state: ChainState::Start,
            visited: 0,
        }
    }

    pub fn state(&self) -> ChainState {
        self.state
    }

    /// Restarts the walk from the first cluster.
    pub fn rewind(&mut self) {
        self.state = ChainState::Start;
        self.visited = 0;
    }

    /// Moves to the error state, the walk is over.
    fn abort(&mut self) {
        self.state = ChainState::Error;
    }

    /// Ends the walk before the terminal marker, e.g. once the whole file was read.
    fn finish(&mut self) {
        if self.state != ChainState::Error {
            self.state = ChainState::Done;
        }
    }

    fn fail(&mut self, err: FATError) -> Option<Result<u16, FATError>> {
        self.abort();
        Some(Err(err))
    }

    fn enter(&mut self, cluster: u16) -> Option<Result<u16, FATError>> {
        if is_chain_end(cluster) {
            self.state = ChainState::Done;
            return None;
        }
        if cluster == 1 {
            return self.fail(FATError::InvalidCluster(cluster));
        }
        // A chain can't hold more clusters than the FAT has entries.
        if self.visited >= self.fat.entry_count() {
            return self.fail(FATError::ChainLoop(self.start));
        }

        self.visited += 1;
        self.state = ChainState::InChain(cluster);
        Some(Ok(cluster))
    }
}

impl Iterator for ClusterChain<'_> {
    type Item = Result<u16, FATError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.state {
            ChainState::Start => self.enter(self.start),
            ChainState::InChain(cluster) => match self.fat.entry_of(cluster) {
                Ok(next) => self.enter(next),
                Err(err) => self.fail(err),
            },
            ChainState::Done | ChainState::Error => None,
        }
    }
}

/// How much of the last cluster of a file is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractMode {
    /// Stop at the size recorded in the directory entry
    #[default]
    Exact,
    /// Produce whole clusters, including the slack after the end of the file
    WholeClusters,
}

/// Lazy stream over the content of a file, one cluster buffer at a time.
///
/// Each step reads one cluster from the image. Any failure is yielded once, then the stream
/// ends. [`ClusterStream::rewind`] restarts the stream from the first cluster.
pub struct ClusterStream<'a, R: VolumeReader + ?Sized> {
    bpb: &'a Bpb,
    volume_offset: u64,
    chain: ClusterChain<'a>,
    reader: &'a mut R,
    mode: ExtractMode,
    file_size: u64,
    remaining: u64,
}

impl<'a, R: VolumeReader + ?Sized> ClusterStream<'a, R> {
    pub fn new(
        bpb: &'a Bpb,
        fat: &'a FatTable,
        volume_offset: u64,
        reader: &'a mut R,
        start: u16,
        file_size: u32,
        mode: ExtractMode,
    ) -> Self {
        ClusterStream {
            bpb,
            volume_offset,
            chain: ClusterChain::new(fat, start),
            reader,
            mode,
            file_size: file_size.into(),
            remaining: file_size.into(),
        }
    }

    pub fn state(&self) -> ChainState {
        self.chain.state()
    }

    pub fn rewind(&mut self) {
        self.chain.rewind();
        self.remaining = self.file_size;
    }

    /// Reads the rest of the stream into a single buffer.
    ///
    /// # Errors
    /// - The first failure met while walking the chain
    pub fn read_to_end(mut self) -> Result<Vec<u8>, FATError> {
        let mut data = Vec::new();
        for chunk in &mut self {
            data.extend_from_slice(&chunk?);
        }

        Ok(data)
    }

    fn read_cluster(&mut self, cluster: u16) -> Result<Vec<u8>, FATError> {
        let address = cluster_address(self.bpb, self.volume_offset, cluster)?;
        trace!("Reading cluster {cluster} at 0x{address:X}");

        utils::read_region(&mut *self.reader, address, self.bpb.cluster_size())
    }
}

impl<R: VolumeReader + ?Sized> Iterator for ClusterStream<'_, R> {
    type Item = Result<Vec<u8>, FATError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.mode == ExtractMode::Exact && self.remaining == 0 {
            self.chain.finish();
            return None;
        }

        let cluster = match self.chain.next() {
            Some(Ok(cluster)) => cluster,
            Some(Err(err)) => return Some(Err(err)),
            None => {
                if self.mode == ExtractMode::Exact && self.chain.state() == ChainState::Done {
                    warn!(
                        "Cluster chain starting at {} ended {} bytes short of the file size",
                        self.chain.start, self.remaining
                    );
                    self.remaining = 0;
                }
                return None;
            }
        };

        let mut buf = match self.read_cluster(cluster) {
            Ok(buf) => buf,
            Err(err) => {
                self.chain.abort();
                return Some(Err(err));
            }
        };

        if self.mode == ExtractMode::Exact {
            let len = (buf.len() as u64).min(self.remaining);
            buf.truncate(len as usize);
            self.remaining -= len;
        }

        Some(Ok(buf))
    }
}
