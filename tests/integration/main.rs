mod infra;

mod get_settings;
mod multicast;
mod pointer_graph;
mod protocol_version;
mod unicast;
mod version_down_conversion;
