use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("root bone not found in the node hierarchy")]
    RootBoneNotFound,

    #[error("unknown animation: {name}")]
    UnknownAnimation { name: String },

    #[error("unknown bone: {name}")]
    UnknownBone { name: String },

    #[error("invalid bone id: {id}")]
    InvalidBoneId { id: usize },

    #[error("unknown parent bone {parent} for bone '{bone}'")]
    UnknownParentBone { bone: String, parent: usize },

    #[error("bone '{bone}' was given id {actual}, expected {expected}")]
    BoneIdMismatch {
        bone: String,
        expected: usize,
        actual: usize,
    },

    #[error("bone '{bone}' has no parent but '{existing}' is already the root")]
    MultipleRootBones { bone: String, existing: String },

    #[error("duplicate bone: {name}")]
    DuplicateBone { name: String },

    #[error("offset matrix of bone '{bone}' is not invertible")]
    DegenerateOffsetMatrix { bone: String },

    #[error("bone '{bone}' weights vertex {vertex}, but the mesh has {count} vertices")]
    VertexOutOfRange {
        bone: String,
        vertex: usize,
        count: usize,
    },

    #[error("invalid value: {message}")]
    InvalidValue { message: String },

    #[error("static decomposition failed: {message}")]
    Decomposer { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to write OBJ: {0}")]
    Obj(#[from] obj::ObjError),

    #[cfg(feature = "json")]
    #[error("failed to parse scene JSON: {message}")]
    JsonParse { message: String },
}
