//! Command-line front ends for parget: `pgcl` (client) and `pgsrv` (server).

pub mod cli;
