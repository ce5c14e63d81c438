use std::{fs, io};
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::{Duration, Instant};

/// Reads a text file into its non-empty, trimmed lines.
pub(crate) fn file_to_vec(filename: impl AsRef<Path>) -> io::Result<Vec<String>> {
    let file_in = fs::File::open(filename)?;
    let file_reader = BufReader::new(file_in);
    let mut lines = Vec::new();
    for line in file_reader.lines() {
        let line = line?;
        let line = line.trim();
        if !line.is_empty() {
            lines.push(line.to_string());
        }
    }
    Ok(lines)
}

/// Logs the time spent in `l_step` since `_detect_elapsed` and returns the new elapsed mark.
pub(crate) fn trace(l_type: &str, l_step: &str, detect: Instant, _detect_elapsed: Duration) -> Duration {
    let elapsed = detect.elapsed();
    log::trace!("{} | Total={:.2?} | {}={:.2?}", l_type, elapsed, l_step, elapsed.saturating_sub(_detect_elapsed));
    elapsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn file_to_vec_skips_blank_lines() {
        let path = std::env::temp_dir().join(format!("bvr_labels_{}.txt", std::process::id()));
        {
            let mut file = fs::File::create(&path).unwrap();
            writeln!(file, "person\n\n  car  \nbus").unwrap();
        }
        let lines = file_to_vec(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(lines, vec!["person", "car", "bus"]);
    }
}
