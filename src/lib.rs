//! crypt(3) compatible SHA-512 password hashing for FTP virtual users, PAM
//! stores and shadow-style password fields. Hashing is done in-process so no
//! external `openssl passwd` or `mkpasswd` binary is needed.

pub mod config;
pub mod crypto;
