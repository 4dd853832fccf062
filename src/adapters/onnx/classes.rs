use std::collections::BTreeMap;
use tracing::warn;

/// COCO class names (80 classes), the table YOLOv8 checkpoints ship with.
pub const COCO_CLASSES: &[&str] = &[
    "person", "bicycle", "car", "motorcycle", "airplane", "bus", "train", "truck",
    "boat", "traffic light", "fire hydrant", "stop sign", "parking meter", "bench",
    "bird", "cat", "dog", "horse", "sheep", "cow", "elephant", "bear", "zebra",
    "giraffe", "backpack", "umbrella", "handbag", "tie", "suitcase", "frisbee",
    "skis", "snowboard", "sports ball", "kite", "baseball bat", "baseball glove",
    "skateboard", "surfboard", "tennis racket", "bottle", "wine glass", "cup",
    "fork", "knife", "spoon", "bowl", "banana", "apple", "sandwich", "orange",
    "broccoli", "carrot", "hot dog", "pizza", "donut", "cake", "chair", "couch",
    "potted plant", "bed", "dining table", "toilet", "tv", "laptop", "mouse",
    "remote", "keyboard", "cell phone", "microwave", "oven", "toaster", "sink",
    "refrigerator", "book", "clock", "vase", "scissors", "teddy bear", "hair drier",
    "toothbrush",
];

pub fn coco_labels() -> Vec<String> {
    COCO_CLASSES.iter().map(|s| s.to_string()).collect()
}

/// Class table for a model: its own `names` metadata when readable, COCO otherwise.
pub fn labels_from_metadata(raw: Option<&str>, model_name: &str) -> Vec<String> {
    match raw {
        Some(raw) => parse_names_metadata(raw).unwrap_or_else(|| {
            warn!("Unreadable 'names' metadata in {}, using COCO classes", model_name);
            coco_labels()
        }),
        None => coco_labels(),
    }
}

/// Parses the `names` metadata entry written by the YOLO exporter, a Python
/// dict literal such as `{0: 'person', 1: 'bicycle'}`.
///
/// Returns `None` unless the keys are exactly `0..n`.
pub fn parse_names_metadata(raw: &str) -> Option<Vec<String>> {
    let body = raw.trim().strip_prefix('{')?.strip_suffix('}')?;
    let mut chars = body.chars().peekable();
    let mut names = BTreeMap::new();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        if chars.peek().is_none() {
            break;
        }

        let mut key = String::new();
        while let Some(d) = chars.next_if(|c| c.is_ascii_digit()) {
            key.push(d);
        }
        let key: usize = key.parse().ok()?;

        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        if chars.next()? != ':' {
            return None;
        }
        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        let quote = chars.next()?;
        if quote != '\'' && quote != '"' {
            return None;
        }
        let mut value = String::new();
        loop {
            match chars.next()? {
                c if c == quote => break,
                c => value.push(c),
            }
        }
        names.insert(key, value);

        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        match chars.next() {
            Some(',') => continue,
            None => break,
            Some(_) => return None,
        }
    }

    if names.is_empty() || names.keys().enumerate().any(|(i, &k)| i != k) {
        return None;
    }
    Some(names.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coco_table() {
        assert_eq!(COCO_CLASSES.len(), 80);
        assert_eq!(COCO_CLASSES[0], "person");
        assert_eq!(COCO_CLASSES[67], "cell phone");
    }

    #[test]
    fn parses_exporter_dict() {
        let names = parse_names_metadata("{0: 'person', 1: 'bicycle', 2: \"hot dog\"}").unwrap();
        assert_eq!(names, ["person", "bicycle", "hot dog"]);
    }

    #[test]
    fn tolerates_trailing_comma_and_commas_in_names() {
        let names = parse_names_metadata("{0: 'a, b', 1: 'c',}").unwrap();
        assert_eq!(names, ["a, b", "c"]);
    }

    #[test]
    fn metadata_names_win_over_coco() {
        let labels = labels_from_metadata(Some("{0: 'pallet', 1: 'forklift'}"), "warehouse");
        assert_eq!(labels, ["pallet", "forklift"]);
    }

    #[test]
    fn falls_back_to_coco() {
        assert_eq!(labels_from_metadata(None, "yolov8n").len(), 80);
        let labels = labels_from_metadata(Some("not a dict"), "yolov8n");
        assert_eq!(labels, coco_labels());
    }

    #[test]
    fn rejects_gaps_and_garbage() {
        assert!(parse_names_metadata("{0: 'a', 2: 'c'}").is_none());
        assert!(parse_names_metadata("{}").is_none());
        assert!(parse_names_metadata("['a', 'b']").is_none());
        assert!(parse_names_metadata("{0: 'unterminated}").is_none());
        assert!(parse_names_metadata("{x: 'a'}").is_none());
    }
}
