//! Mapping of capability bit numbers to their names.

/// Capability names, indexed by bit number (see `capabilities(7)`).
pub const CAPABILITY_NAMES: [&str; 41] = [
    "cap_chown",
    "cap_dac_override",
    "cap_dac_read_search",
    "cap_fowner",
    "cap_fsetid",
    "cap_kill",
    "cap_setgid",
    "cap_setuid",
    "cap_setpcap",
    "cap_linux_immutable",
    "cap_net_bind_service",
    "cap_net_broadcast",
    "cap_net_admin",
    "cap_net_raw",
    "cap_ipc_lock",
    "cap_ipc_owner",
    "cap_sys_module",
    "cap_sys_rawio",
    "cap_sys_chroot",
    "cap_sys_ptrace",
    "cap_sys_pacct",
    "cap_sys_admin",
    "cap_sys_boot",
    "cap_sys_nice",
    "cap_sys_resource",
    "cap_sys_time",
    "cap_sys_tty_config",
    "cap_mknod",
    "cap_lease",
    "cap_audit_write",
    "cap_audit_control",
    "cap_setfcap",
    "cap_mac_override",
    "cap_mac_admin",
    "cap_syslog",
    "cap_wake_alarm",
    "cap_block_suspend",
    "cap_audit_read",
    "cap_perfmon",
    "cap_bpf",
    "cap_checkpoint_restore",
];

/// Returns the name of capability `bit`, synthesizing `cap_<bit>` for bits
/// this table does not know yet.
#[must_use]
pub fn capability_name(bit: usize) -> String {
    CAPABILITY_NAMES
        .get(bit)
        .map_or_else(|| format!("cap_{bit}"), |name| (*name).to_string())
}

/// Expands capability words (least significant word first) into names,
/// ordered by ascending bit number.
#[must_use]
pub fn caps_to_names(words: &[u32]) -> Vec<String> {
    words
        .iter()
        .enumerate()
        .flat_map(|(index, &word)| {
            (0..u32::BITS as usize)
                .filter(move |bit| word & (1 << bit) != 0)
                .map(move |bit| index * u32::BITS as usize + bit)
        })
        .map(capability_name)
        .collect()
}

/// Encodes capability bit numbers into words, least significant word
/// first; the inverse of [`caps_to_names`] on bit numbers.
#[must_use]
pub fn bits_to_words(bits: &[usize]) -> Vec<u32> {
    let len = bits.iter().max().map_or(0, |max| max / u32::BITS as usize + 1);
    let mut words = vec![0_u32; len];
    for &bit in bits {
        words[bit / u32::BITS as usize] |= 1 << (bit % u32::BITS as usize);
    }
    words
}
