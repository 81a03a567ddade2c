//! Simulation network: nodes and directed links.

use std::collections::{BTreeMap, BTreeSet};

use geo_types::Coord;
use serde::Serialize;

use crate::domain::{LinkId, NodeId};

use super::ScheduleError;

/// Mode name of street links.
pub const CAR_MODE: &str = "car";

/// Default capacity of street links, in vehicles per hour.
pub const STREET_LINK_CAPACITY: f64 = 2000.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub id: NodeId,
    pub coord: Coord<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    pub id: LinkId,
    pub from: NodeId,
    pub to: NodeId,
    /// Metres.
    pub length: f64,
    /// Metres per second.
    pub freespeed: f64,
    /// Vehicles per hour.
    pub capacity: f64,
    pub modes: BTreeSet<String>,
}

impl Link {
    /// A link between two nodes with no modes allowed yet.
    pub fn new(id: LinkId, from: NodeId, to: NodeId) -> Self {
        Self {
            id,
            from,
            to,
            length: 0.0,
            freespeed: 0.0,
            capacity: 0.0,
            modes: BTreeSet::new(),
        }
    }

    pub fn with_length(mut self, length: f64) -> Self {
        self.length = length;
        self
    }

    pub fn with_freespeed(mut self, freespeed: f64) -> Self {
        self.freespeed = freespeed;
        self
    }

    pub fn with_capacity(mut self, capacity: f64) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_modes<I, S>(mut self, modes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modes = modes.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_loop(&self) -> bool {
        self.from == self.to
    }
}

/// Nodes and links keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Network {
    nodes: BTreeMap<NodeId, Node>,
    links: BTreeMap<LinkId, Link>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: Node) -> Result<(), ScheduleError> {
        if self.nodes.contains_key(&node.id) {
            return Err(ScheduleError::DuplicateNode(node.id));
        }
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    /// Adds a link; both its nodes must already exist.
    pub fn add_link(&mut self, link: Link) -> Result<(), ScheduleError> {
        if self.links.contains_key(&link.id) {
            return Err(ScheduleError::DuplicateLink(link.id));
        }
        for node in [&link.from, &link.to] {
            if !self.nodes.contains_key(node) {
                return Err(ScheduleError::UnknownNode {
                    link: link.id.clone(),
                    node: node.clone(),
                });
            }
        }
        self.links.insert(link.id.clone(), link);
        Ok(())
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn link(&self, id: &LinkId) -> Option<&Link> {
        self.links.get(id)
    }

    pub fn link_mut(&mut self, id: &LinkId) -> Option<&mut Link> {
        self.links.get_mut(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }
}
