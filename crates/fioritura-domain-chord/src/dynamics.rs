/// Velocity bands mapped to dynamic names. Process-wide constant, never
/// mutated at runtime. Band thresholds are the lowest velocity of each
/// dynamic.
const DYNAMICS: &[(u8, &str)] = &[
    (113, "ffff"),
    (99, "fff"),
    (85, "ff"),
    (71, "f"),
    (57, "mf"),
    (43, "mp"),
    (29, "p"),
    (15, "pp"),
    (1, "ppp"),
    (0, "pppp"),
];

pub fn dynamic_name(velocity: u8) -> &'static str {
    for &(threshold, name) in DYNAMICS {
        if velocity >= threshold {
            return name;
        }
    }
    "pppp"
}
