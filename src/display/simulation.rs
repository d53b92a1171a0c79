//! Simulation output

/// Archives deleted by a simulated expiration, then the survivors
pub fn format_simulation(deleted: &[String], remaining: &[String]) -> String {
    let mut output = String::new();

    output.push_str(&format!("Deleted ({}):\n", deleted.len()));
    for name in deleted {
        output.push_str(&format!("  {}\n", name));
    }

    output.push_str(&format!("Remaining ({}):\n", remaining.len()));
    for name in remaining {
        output.push_str(&format!("  {}\n", name));
    }

    output
}
