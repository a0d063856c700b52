//! One module per subcommand, each exposing `execute`.

pub mod cipher;
pub mod decipher;
pub mod diffie_hellman;
pub mod hash;
pub mod hmac;
pub mod prng;
pub mod scrypt;
