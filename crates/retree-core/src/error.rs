use thiserror::Error;

use crate::host::HostNodeId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("host node {id} does not exist")]
    Missing { id: HostNodeId },
    #[error("host node {id} is not an element")]
    NotAnElement { id: HostNodeId },
    #[error("host node {id} is not a text node")]
    NotAText { id: HostNodeId },
    #[error("host node {child} is not a child of {parent}")]
    NotAChild {
        parent: HostNodeId,
        child: HostNodeId,
    },
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no root container supplied")]
    MissingContainer,
    #[error("no root descriptor supplied")]
    MissingRoot,
    #[error("root container {0} is not part of the document")]
    UnknownContainer(HostNodeId),
    #[error(transparent)]
    Host(#[from] HostError),
    #[error("render loop did not settle after {passes} passes")]
    Unsettled { passes: usize },
}
