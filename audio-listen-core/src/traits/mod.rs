pub mod listen_backend;
