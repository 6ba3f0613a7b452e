//! SHA-512 crypt (`$6$`) primitive, split into the stages of the scheme so
//! each one can be audited against the reference description on its own.

pub mod encoding;
pub mod mixer;
pub mod rounds;
pub mod salt;
pub mod shacrypt;
