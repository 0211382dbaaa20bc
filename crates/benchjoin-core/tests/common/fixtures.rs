//! Helpers for laying out raw benchmark trees on disk

use std::fs;
use std::path::Path;

use benchjoin_core::sources::default_image_files;

/// Write `contents` to `root/relative`, creating parent directories
pub fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// CSV with one `Time (s)` column
pub fn stage_csv(values: &[f64]) -> String {
    let mut csv = String::from("Time (s)\n");
    for value in values {
        csv.push_str(&format!("{}\n", value));
    }
    csv
}

/// Write all eight stage files of the image benchmarks.
///
/// Every stage gets `stage_values`; the descriptor file (the first stage)
/// additionally carries `descriptors` as `(header, per-trial values)` pairs.
#[allow(dead_code)]
pub fn write_image_tree(root: &Path, stage_values: &[f64], descriptors: &[(&str, Vec<String>)]) {
    let files = default_image_files();
    for (index, file) in files.iter().enumerate() {
        let relative = file.path.to_str().unwrap();
        if index > 0 {
            write(root, relative, &stage_csv(stage_values));
            continue;
        }

        let mut headers: Vec<&str> = descriptors.iter().map(|(name, _)| *name).collect();
        headers.push("Time (s)");
        let mut csv = headers.join(",");
        csv.push('\n');
        for (trial, value) in stage_values.iter().enumerate() {
            let mut fields: Vec<String> = descriptors
                .iter()
                .map(|(_, values)| values[trial].clone())
                .collect();
            fields.push(value.to_string());
            csv.push_str(&fields.join(","));
            csv.push('\n');
        }
        write(root, relative, &csv);
    }
}

/// Strings from anything displayable
#[allow(dead_code)]
pub fn strings<T: ToString>(values: &[T]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}
