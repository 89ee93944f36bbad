//! winget 输出解析函数

use unicode_width::UnicodeWidthChar;

/// 清理终端输出中的 ANSI 转义序列和进度动画
///
/// winget 在非交互模式下仍会用 `\r` 绘制旋转进度符，
/// 这里把 `\r` 之前被覆盖的内容整行丢弃，只保留最后一次绘制的内容。
pub fn clean_terminal_output(input: &str) -> String {
    let mut result = String::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\x1b' => {
                if chars.peek() == Some(&'[') {
                    chars.next();
                    while let Some(&next) = chars.peek() {
                        chars.next();
                        if next.is_ascii_alphabetic() {
                            break;
                        }
                    }
                }
            }
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    continue;
                }
                // 回到行首：丢弃当前行已写入的内容
                let line_start = result.rfind('\n').map(|p| p + 1).unwrap_or(0);
                result.truncate(line_start);
            }
            c if c.is_control() && c != '\n' && c != '\t' => {}
            _ => result.push(c),
        }
    }

    result
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// `winget search` 结果表中的一行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRow {
    pub name: String,
    pub id: String,
    /// `Match` 列的原始内容，如 `Command: git`；按名称搜索时通常没有这一列
    pub matched: Option<String>,
    pub source: Option<String>,
}

impl SearchRow {
    /// 命中值：`Command: git` 取 `git`，没有 `Match` 列时取包名
    pub fn matched_value(&self) -> &str {
        match &self.matched {
            Some(raw) => match raw.find(':') {
                Some(pos) => raw[pos + 1..].trim(),
                None => raw.trim(),
            },
            None => &self.name,
        }
    }
}

fn is_separator(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= 3 && trimmed.chars().all(|c| c == '-')
}

/// 每个字符及其起始显示列；winget 按显示宽度对齐，CJK 字符占两列
fn display_cells(line: &str) -> Vec<(usize, char)> {
    let mut col = 0;
    line.chars()
        .map(|c| {
            let start = col;
            col += c.width().unwrap_or(0);
            (start, c)
        })
        .collect()
}

/// 表头中每一列的起始显示列
fn column_starts(header: &[(usize, char)]) -> Vec<usize> {
    let mut starts = Vec::new();
    let mut prev_blank = true;
    for &(col, c) in header {
        if !c.is_whitespace() && prev_blank {
            starts.push(col);
        }
        prev_blank = c.is_whitespace();
    }
    starts
}

fn slice_column(row: &[(usize, char)], start: usize, end: Option<usize>) -> String {
    row.iter()
        .filter(|(col, _)| *col >= start && end.map_or(true, |e| *col < e))
        .map(|&(_, c)| c)
        .collect::<String>()
        .trim()
        .to_string()
}

/// 解析 `winget search` 的表格输出
///
/// 列边界取自表头各列的起始显示列：
/// ```text
/// Name  Id       Version Match        Source
/// -------------------------------------------
/// Git   Git.Git  2.45.1  Command: git winget
/// ```
pub fn parse_search_output(output: &str) -> Vec<SearchRow> {
    let cleaned = clean_terminal_output(output);
    let lines: Vec<&str> = cleaned.lines().collect();

    let Some(sep) = lines.iter().position(|l| is_separator(l)) else {
        return Vec::new();
    };
    if sep == 0 {
        return Vec::new();
    }

    let header = display_cells(lines[sep - 1]);
    let starts = column_starts(&header);
    if starts.len() < 3 {
        return Vec::new();
    }
    let titles: Vec<String> = starts
        .iter()
        .enumerate()
        .map(|(k, &s)| slice_column(&header, s, starts.get(k + 1).copied()))
        .collect();

    // 英文表头按列名定位，本地化表头退回到固定顺序 Name/Id/Version/Match/Source
    let match_col = titles
        .iter()
        .position(|t| t == "Match")
        .or(if starts.len() >= 5 { Some(3) } else { None });
    let source_col = titles
        .iter()
        .position(|t| t == "Source")
        .or(if starts.len() >= 4 { Some(starts.len() - 1) } else { None })
        .filter(|&c| Some(c) != match_col);

    let mut rows = Vec::new();
    for line in &lines[sep + 1..] {
        let cells = display_cells(line);
        let col = |k: usize| slice_column(&cells, starts[k], starts.get(k + 1).copied());

        let id = col(1);
        if id.is_empty() {
            continue;
        }
        rows.push(SearchRow {
            name: col(0),
            id,
            matched: match_col.map(col).filter(|s| !s.is_empty()),
            source: source_col.map(col).filter(|s| !s.is_empty()),
        });
    }

    rows
}

/// winget 找不到任何包时的提示（此时退出码非零）
pub fn is_no_results(output: &str) -> bool {
    let cleaned = clean_terminal_output(output);
    cleaned.contains("No package found matching input criteria")
}
