//! CLI parse tests.

use super::{normalize_single_dash_flags, ClientCli, ServerCli, CLIENT_SINGLE_DASH_FLAGS};
use clap::Parser;
use std::ffi::OsString;

pub(super) fn parse_client(args: &[&str]) -> Result<ClientCli, clap::Error> {
    let args = args.iter().map(OsString::from);
    ClientCli::try_parse_from(normalize_single_dash_flags(args, CLIENT_SINGLE_DASH_FLAGS))
}

pub(super) fn parse_server(args: &[&str]) -> ServerCli {
    ServerCli::try_parse_from(args).unwrap()
}

mod fetch;
