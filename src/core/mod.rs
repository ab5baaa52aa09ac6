pub mod edge;
pub mod node;

pub use edge::{Association, ProjectionEdge, ReportedProbabilities};
pub use node::{Node, NodeId, NodeKind};
