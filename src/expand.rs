const SELF_REFERENCE: &str = "$$";

/// Replaces every `$$`, left to right, with the decimal `pid`.
pub fn expand_pid(input: &str, pid: u32) -> String {
    let occurrences = input.matches(SELF_REFERENCE).count();
    if occurrences == 0 {
        return input.to_string();
    }

    let pid = pid.to_string();
    let mut result = String::with_capacity(input.len() + occurrences * pid.len());
    let mut rest = input;
    while let Some(at) = rest.find(SELF_REFERENCE) {
        result.push_str(&rest[..at]);
        result.push_str(&pid);
        rest = &rest[at + SELF_REFERENCE.len()..];
    }
    result.push_str(rest);
    result
}
