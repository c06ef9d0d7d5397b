// @generated by pktnames; do not edit.

#[allow(non_upper_case_globals)]
pub mod pktnames {
use std::collections::HashMap;
use std::sync::LazyLock;

pub static clientbound: LazyLock<HashMap<&str, &str>> = LazyLock::new(|| {
    HashMap::from([
        ("0101", "Handshake"),
        ("1a08", "Path\\Login"),
    ])
});

pub static tribulle_serverbound: LazyLock<HashMap<&str, &str>> = LazyLock::new(|| {
    HashMap::from([
        ("0010", "Whisper"),
    ])
});

}
