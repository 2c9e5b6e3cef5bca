//! The closed set of synced collections.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named collection of synced records.
///
/// The set of collections is closed at compile time; persistence is
/// never routed through a runtime string-to-table lookup. Unknown
/// collection names arriving on the wire are rejected at the boundary
/// as a permanent malformed-operation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Collection {
    /// Fleet assets (vehicles, equipment).
    Assets,
    /// Maintenance work orders.
    WorkOrders,
    /// Spare-part inventory.
    Inventory,
    /// Scheduled maintenance tasks.
    MaintenanceTasks,
    /// GPS position reports from assets.
    AssetLocations,
    /// Operator shift sessions.
    OperatorSessions,
    /// Vehicle inspections.
    Inspections,
}

impl Collection {
    /// All known collections, in a stable order.
    pub const ALL: [Collection; 7] = [
        Collection::Assets,
        Collection::WorkOrders,
        Collection::Inventory,
        Collection::MaintenanceTasks,
        Collection::AssetLocations,
        Collection::OperatorSessions,
        Collection::Inspections,
    ];

    /// Returns the wire name of the collection.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Assets => "assets",
            Collection::WorkOrders => "work-orders",
            Collection::Inventory => "inventory",
            Collection::MaintenanceTasks => "maintenance-tasks",
            Collection::AssetLocations => "asset-locations",
            Collection::OperatorSessions => "operator-sessions",
            Collection::Inspections => "inspections",
        }
    }

    /// Resolves a wire name to a collection.
    ///
    /// Returns `None` for unknown names; callers at the boundary
    /// translate that into a permanent malformed-operation rejection.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.name() == name)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
