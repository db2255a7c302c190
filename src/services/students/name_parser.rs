//! 名单解析与显示名生成
//!
//! 支持 JSON（字符串数组、对象数组或包着数组的对象）、CSV 以及每行一个姓名的纯文本。
//! 解析错误不会中断解析，而是收集到 `errors` 中。

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// 对象数组中姓名字段的查找顺序
const NAME_KEYS: [&str; 9] = [
    "name",
    "Name",
    "student",
    "studentName",
    "student_name",
    "fullName",
    "full_name",
    "displayName",
    "display_name",
];

const NAME_SUFFIXES: [&str; 6] = ["jr", "sr", "ii", "iii", "iv", "v"];

/// "Last, First" 形式的整行
static LAST_FIRST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^,]+,\s+[^,]+$").expect("Invalid last-first regex"));

const LAST_FIRST_SAMPLE: usize = 10;
const LAST_FIRST_THRESHOLD: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterFormat {
    Json,
    Csv,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRoster {
    pub names: Vec<String>,
    pub errors: Vec<String>,
}

pub fn detect_format(content: &str, filename: Option<&str>) -> RosterFormat {
    if let Some(ext) = filename
        .and_then(|f| f.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
    {
        match ext.as_str() {
            "json" => return RosterFormat::Json,
            "csv" => return RosterFormat::Csv,
            _ => {}
        }
    }

    let trimmed = content.trim_start();
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        RosterFormat::Json
    } else {
        RosterFormat::Csv
    }
}

pub fn parse_roster(content: &str, filename: Option<&str>) -> ParsedRoster {
    if content.trim().is_empty() {
        return ParsedRoster {
            names: vec![],
            errors: vec!["No content to parse".to_string()],
        };
    }

    match detect_format(content, filename) {
        RosterFormat::Json => parse_json(content),
        RosterFormat::Csv => parse_csv(content),
    }
}

fn parse_json(content: &str) -> ParsedRoster {
    let value: serde_json::Value = match serde_json::from_str(content) {
        Ok(value) => value,
        Err(e) => {
            return ParsedRoster {
                names: vec![],
                errors: vec![format!("Invalid JSON: {e}")],
            };
        }
    };

    let items = match value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(map) => {
            match map.into_iter().find_map(|(_, v)| match v {
                serde_json::Value::Array(items) => Some(items),
                _ => None,
            }) {
                Some(items) => items,
                None => {
                    return ParsedRoster {
                        names: vec![],
                        errors: vec!["JSON object contains no array of students".to_string()],
                    };
                }
            }
        }
        _ => {
            return ParsedRoster {
                names: vec![],
                errors: vec!["JSON must be an array or an object".to_string()],
            };
        }
    };

    let mut roster = ParsedRoster::default();
    for (index, item) in items.iter().enumerate() {
        match json_item_name(item) {
            Some(name) => roster.names.push(name),
            None => roster
                .errors
                .push(format!("Item {}: no name found", index + 1)),
        }
    }
    if roster.names.is_empty() && roster.errors.is_empty() {
        roster.errors.push("No names found".to_string());
    }
    roster
}

fn json_item_name(item: &serde_json::Value) -> Option<String> {
    let name = match item {
        serde_json::Value::String(s) => Some(s.as_str()),
        serde_json::Value::Object(map) => NAME_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(|v| v.as_str()))
            .or_else(|| map.values().find_map(|v| v.as_str())),
        _ => None,
    }?;

    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

fn is_header(line: &str) -> bool {
    let lower = line.to_lowercase();
    lower.contains("name") || lower.contains("student")
}

fn parse_csv(content: &str) -> ParsedRoster {
    let lines: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let has_header = lines.first().is_some_and(|l| is_header(l));
    let data = if has_header { &lines[1..] } else { &lines[..] };

    if data.is_empty() {
        return ParsedRoster {
            names: vec![],
            errors: vec!["No names found".to_string()],
        };
    }

    // "Last, First" 每行一个姓名，不能按逗号拆列
    let sample: Vec<&&str> = data.iter().take(LAST_FIRST_SAMPLE).collect();
    let matching = sample.iter().filter(|l| LAST_FIRST_RE.is_match(l)).count();
    if matching as f64 / sample.len() as f64 >= LAST_FIRST_THRESHOLD {
        return ParsedRoster {
            names: data.iter().map(|l| l.to_string()).collect(),
            errors: vec![],
        };
    }

    parse_csv_records(content, has_header)
}

fn parse_csv_records(content: &str, has_header: bool) -> ParsedRoster {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut roster = ParsedRoster::default();
    let mut column = 0;
    let mut header_pending = has_header;

    for (index, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                roster.errors.push(format!("Row {}: {e}", index + 1));
                continue;
            }
        };
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        if header_pending {
            header_pending = false;
            column = name_column(&record);
            continue;
        }

        match record.get(column).filter(|cell| !cell.is_empty()) {
            Some(name) => roster.names.push(name.to_string()),
            None => roster
                .errors
                .push(format!("Row {}: missing name", index + 1)),
        }
    }
    roster
}

fn name_column(header: &csv::StringRecord) -> usize {
    let cells: Vec<String> = header.iter().map(str::to_lowercase).collect();
    cells
        .iter()
        .position(|c| c.contains("name"))
        .or_else(|| cells.iter().position(|c| c.contains("student")))
        .unwrap_or(0)
}

/// 姓名拆分结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameParts {
    /// 名（带后缀，如 "John Jr"）
    pub first: String,
    pub last: String,
}

fn is_suffix(token: &str) -> bool {
    let bare = token.trim_end_matches('.').to_lowercase();
    NAME_SUFFIXES.contains(&bare.as_str())
}

/// 拆分 "Last, First" 或 "First [Middle] Last [Suffix]"
pub fn split_name(name: &str) -> NameParts {
    let name = name.trim();

    if let Some((last, first)) = name.split_once(',') {
        let first = first.trim();
        let last = last.trim();
        if !first.is_empty() && !last.is_empty() {
            // "Smith Jr, John" 的后缀归到名上
            let mut last_tokens: Vec<&str> = last.split_whitespace().collect();
            let mut first = first.to_string();
            if last_tokens.len() > 1
                && last_tokens.last().is_some_and(|t| is_suffix(t))
                && let Some(suffix) = last_tokens.pop()
            {
                first = format!("{first} {suffix}");
            }
            return NameParts {
                first,
                last: last_tokens.join(" "),
            };
        }
    }

    let mut tokens: Vec<&str> = name.split_whitespace().collect();
    let suffix = if tokens.len() > 2 && tokens.last().is_some_and(|t| is_suffix(t)) {
        tokens.pop()
    } else {
        None
    };

    let first_token = tokens.first().copied().unwrap_or_default();
    let first = match suffix {
        Some(suffix) => format!("{first_token} {suffix}"),
        None => first_token.to_string(),
    };
    let last = if tokens.len() > 1 {
        tokens.last().copied().unwrap_or_default().to_string()
    } else {
        String::new()
    };

    NameParts { first, last }
}

fn initial(last: &str) -> Option<char> {
    last.chars().next()
}

/// 生成互不重复的显示名
///
/// 名唯一时只显示名；同名时追加姓的首字母；首字母也相同时显示完整姓；
/// 仍然相同的结果加数字序号。输出与输入一一对应。
pub fn display_names(names: &[String]) -> Vec<String> {
    let parts: Vec<NameParts> = names.iter().map(|n| split_name(n)).collect();

    let mut by_first: HashMap<String, Vec<usize>> = HashMap::new();
    for (i, p) in parts.iter().enumerate() {
        by_first.entry(p.first.to_lowercase()).or_default().push(i);
    }

    let mut result: Vec<String> = parts.iter().map(|p| p.first.clone()).collect();
    for indices in by_first.values().filter(|v| v.len() > 1) {
        let mut by_initial: HashMap<Option<String>, usize> = HashMap::new();
        for &i in indices {
            let key = initial(&parts[i].last).map(|c| c.to_lowercase().to_string());
            *by_initial.entry(key).or_default() += 1;
        }

        for &i in indices {
            let p = &parts[i];
            let Some(c) = initial(&p.last) else {
                continue;
            };
            let key = Some(c.to_lowercase().to_string());
            result[i] = if by_initial.get(&key).copied().unwrap_or(0) > 1 {
                format!("{} {}", p.first, p.last)
            } else {
                format!("{} {}.", p.first, c)
            };
        }
    }

    dedupe_with_counter(result)
}

fn dedupe_with_counter(names: Vec<String>) -> Vec<String> {
    let mut taken: HashMap<String, usize> = HashMap::new();
    for name in &names {
        *taken.entry(name.to_lowercase()).or_default() += 1;
    }

    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::with_capacity(names.len());
    for name in names {
        let key = name.to_lowercase();
        if taken.get(&key).copied().unwrap_or(0) <= 1 {
            out.push(name);
            continue;
        }

        let count = seen.entry(key.clone()).or_default();
        *count += 1;
        if *count == 1 {
            out.push(name);
            continue;
        }

        let mut n = *count;
        let mut candidate = format!("{name} {n}");
        while taken.contains_key(&candidate.to_lowercase()) {
            n += 1;
            candidate = format!("{name} {n}");
        }
        taken.insert(candidate.to_lowercase(), 1);
        out.push(candidate);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format("[\"a\"]", None), RosterFormat::Json);
        assert_eq!(detect_format("  {\"a\": []}", None), RosterFormat::Json);
        assert_eq!(detect_format("John\nJane", None), RosterFormat::Csv);
        assert_eq!(detect_format("[not json", Some("roster.CSV")), RosterFormat::Csv);
        assert_eq!(detect_format("John", Some("roster.json")), RosterFormat::Json);
    }

    #[test]
    fn test_csv_header_is_dropped() {
        let parsed = parse_roster("name\nJohn\nJane", None);
        assert_eq!(parsed.names, strings(&["John", "Jane"]));
        assert!(parsed.errors.is_empty());
    }

    #[test]
    fn test_last_first_lines_stay_whole() {
        let parsed = parse_roster("Smith, John\nDoe, Jane\nWilson, Amy\n", None);
        assert_eq!(parsed.names, strings(&["Smith, John", "Doe, Jane", "Wilson, Amy"]));
    }

    #[test]
    fn test_real_csv_uses_name_column() {
        let content = "id,Student Name,grade\n1,\"O'Brien, Pat\",5\n2,Lee Kim,5\n3,,5\n";
        let parsed = parse_roster(content, Some("class.csv"));
        assert_eq!(parsed.names, strings(&["O'Brien, Pat", "Lee Kim"]));
        assert_eq!(parsed.errors, vec!["Row 4: missing name".to_string()]);
    }

    #[test]
    fn test_json_shapes() {
        let parsed = parse_roster(r#"["Ann", " Bob ", ""]"#, None);
        assert_eq!(parsed.names, strings(&["Ann", "Bob"]));
        assert_eq!(parsed.errors.len(), 1);

        let parsed = parse_roster(
            r#"[{"id": 1, "fullName": "Cara Diaz", "name": "Cara"}, {"nickname": "Dee"}, {"id": 4}]"#,
            None,
        );
        assert_eq!(parsed.names, strings(&["Cara", "Dee"]));
        assert_eq!(parsed.errors, vec!["Item 3: no name found".to_string()]);

        let parsed = parse_roster(r#"{"class": "5B", "students": [{"student_name": "Eve"}]}"#, None);
        assert_eq!(parsed.names, strings(&["Eve"]));
    }

    #[test]
    fn test_malformed_and_empty_input() {
        let parsed = parse_roster("[\"Ann\",", None);
        assert!(parsed.names.is_empty());
        assert!(parsed.errors[0].starts_with("Invalid JSON"));

        let parsed = parse_roster("   \n ", None);
        assert_eq!(parsed.errors, vec!["No content to parse".to_string()]);
    }

    #[test]
    fn test_split_name_forms() {
        assert_eq!(
            split_name("Smith, John"),
            NameParts {
                first: "John".into(),
                last: "Smith".into()
            }
        );
        assert_eq!(
            split_name("Mary Ann Lee"),
            NameParts {
                first: "Mary".into(),
                last: "Lee".into()
            }
        );
        assert_eq!(split_name("Martin Luther King Jr.").first, "Martin Jr.");
        assert_eq!(split_name("Martin Luther King Jr.").last, "King");
        assert_eq!(split_name("Cher").last, "");
    }

    #[test]
    fn test_surname_first_needs_comma() {
        // 空格分隔一律按 "名 姓" 读，姓在前必须写逗号
        let spaced = split_name("Smith John");
        assert_eq!(spaced.first, "Smith");
        assert_eq!(spaced.last, "John");

        let comma = split_name("Smith,John");
        assert_eq!(comma.first, "John");
        assert_eq!(comma.last, "Smith");
    }

    #[test]
    fn test_display_names_disambiguate() {
        let names = strings(&["Smith, John", "Doe, John", "Wilson, Jane"]);
        assert_eq!(display_names(&names), strings(&["John S.", "John D.", "Jane"]));

        let names = strings(&["John Smith", "john Sanders", "John Doe"]);
        assert_eq!(
            display_names(&names),
            strings(&["John Smith", "john Sanders", "John D."])
        );
    }

    #[test]
    fn test_display_names_counter_keeps_unique() {
        let names = strings(&["Jane", "Jane", "Jane 2", "Jane"]);
        let display = display_names(&names);
        assert_eq!(display.len(), names.len());
        let unique: HashSet<String> = display.iter().map(|d| d.to_lowercase()).collect();
        assert_eq!(unique.len(), display.len());
        assert_eq!(display[0], "Jane");
    }
}
