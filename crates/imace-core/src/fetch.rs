//! Fetch keys and in-flight bookkeeping.
//!
//! Every network read is described by a [`FetchKey`]: what to fetch plus the
//! data epoch it was issued in. Responses are matched back to the key that
//! is current when they arrive, never by arrival order.

use std::collections::HashSet;
use std::fmt;

use crate::error::{ImaceError, Result};
use crate::model::{BrowsePage, ImageRef, SearchResult, SpatialPoint};
use crate::pagination::PageSize;

/// Browse-mode request parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BrowseKey {
    pub page: usize,
    pub page_size: PageSize,
}

/// Operation name, used for de-duplication of parameterless fetches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FetchOp {
    Browse,
    Search,
    AllImages,
    ImagePoints,
    StorageSize,
}

impl fmt::Display for FetchOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Browse => write!(f, "browse page"),
            Self::Search => write!(f, "search"),
            Self::AllImages => write!(f, "image listing"),
            Self::ImagePoints => write!(f, "image points"),
            Self::StorageSize => write!(f, "storage size"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FetchRequest {
    Browse(BrowseKey),
    Search(String),
    AllImages,
    ImagePoints,
    StorageSize,
}

impl FetchRequest {
    pub fn op(&self) -> FetchOp {
        match self {
            Self::Browse(_) => FetchOp::Browse,
            Self::Search(_) => FetchOp::Search,
            Self::AllImages => FetchOp::AllImages,
            Self::ImagePoints => FetchOp::ImagePoints,
            Self::StorageSize => FetchOp::StorageSize,
        }
    }
}

/// A request tagged with the data epoch it belongs to. Mutations that
/// invalidate server data (upload, delete, reload) bump the epoch, which
/// turns every older key stale.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FetchKey {
    pub request: FetchRequest,
    pub epoch: u64,
}

/// Payload of a completed fetch, as produced by the transport.
#[derive(Debug)]
pub enum FetchReply {
    Browse(Result<BrowsePage>),
    Search(Result<Vec<SearchResult>>),
    AllImages(Result<Vec<ImageRef>>),
    ImagePoints(Result<Vec<SpatialPoint>>),
    StorageSize(Result<u64>),
}

impl FetchReply {
    pub fn error(&self) -> Option<&ImaceError> {
        match self {
            Self::Browse(r) => r.as_ref().err(),
            Self::Search(r) => r.as_ref().err(),
            Self::AllImages(r) => r.as_ref().err(),
            Self::ImagePoints(r) => r.as_ref().err(),
            Self::StorageSize(r) => r.as_ref().err(),
        }
    }
}

/// Whether a response changed the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Applied {
    Applied,
    /// The response belonged to a superseded key and was dropped.
    Stale,
}

/// Keys whose responses have not arrived yet.
#[derive(Debug, Default)]
pub struct InFlight {
    keys: HashSet<FetchKey>,
}

impl InFlight {
    /// Register `request` unless an identical one is already outstanding.
    pub fn begin(&mut self, request: FetchRequest, epoch: u64) -> Option<FetchKey> {
        let key = FetchKey { request, epoch };
        if self.keys.contains(&key) {
            return None;
        }
        self.keys.insert(key.clone());
        Some(key)
    }

    pub fn finish(&mut self, key: &FetchKey) -> bool {
        self.keys.remove(key)
    }

    pub fn contains(&self, key: &FetchKey) -> bool {
        self.keys.contains(key)
    }

    pub fn is_running(&self, op: FetchOp) -> bool {
        self.keys.iter().any(|k| k.request.op() == op)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
