//! Parser for pip requirements files.
//!
//! Handles the subset of pip's requirement-file format needed to compare
//! manifests and discover includes:
//! ```text
//! # comment
//! -r base.txt
//! Django>=1.8,<2 \
//!     --hash sha256:abcd
//! -e git+ssh://git@github.com/org/repo.git@470a5d9#egg=repo
//! ```

use super::vcs;
use crate::error::{Error, Result};
use crate::types::{LineOptions, Requirement, RequirementLine};
use std::collections::BTreeSet;
use std::str::Lines;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OptionKind {
    Requirement,
    Constraint,
    Editable,
    Other,
}

struct OptionSpec {
    short: Option<char>,
    long: &'static str,
    takes_value: bool,
    kind: OptionKind,
}

const fn opt(short: Option<char>, long: &'static str, takes_value: bool, kind: OptionKind) -> OptionSpec {
    OptionSpec {
        short,
        long,
        takes_value,
        kind,
    }
}

/// Options pip accepts inside a requirements file.
const OPTIONS: &[OptionSpec] = &[
    opt(Some('r'), "requirement", true, OptionKind::Requirement),
    opt(Some('c'), "constraint", true, OptionKind::Constraint),
    opt(Some('e'), "editable", true, OptionKind::Editable),
    opt(Some('i'), "index-url", true, OptionKind::Other),
    opt(None, "extra-index-url", true, OptionKind::Other),
    opt(Some('f'), "find-links", true, OptionKind::Other),
    opt(None, "trusted-host", true, OptionKind::Other),
    opt(None, "no-binary", true, OptionKind::Other),
    opt(None, "only-binary", true, OptionKind::Other),
    opt(None, "hash", true, OptionKind::Other),
    opt(None, "global-option", true, OptionKind::Other),
    opt(None, "install-option", true, OptionKind::Other),
    opt(None, "use-feature", true, OptionKind::Other),
    opt(None, "no-index", false, OptionKind::Other),
    opt(None, "pre", false, OptionKind::Other),
    opt(None, "prefer-binary", false, OptionKind::Other),
    opt(None, "require-hashes", false, OptionKind::Other),
];

/// Iterator over logical lines: continuations joined, comments stripped,
/// blank lines skipped. Yields `(line_number, text)`.
pub struct LogicalLines<'a> {
    lines: std::iter::Enumerate<Lines<'a>>,
}

impl<'a> LogicalLines<'a> {
    /// Iterate the logical lines of `text`.
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().enumerate(),
        }
    }
}

impl Iterator for LogicalLines<'_> {
    type Item = (usize, String);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut buffer = String::new();
            let mut start = None;

            for (idx, line) in self.lines.by_ref() {
                start.get_or_insert(idx + 1);
                let is_comment = line.trim_start().starts_with('#');

                if !is_comment && let Some(joined) = line.strip_suffix('\\') {
                    buffer.push_str(joined);
                    continue;
                }

                if is_comment && !buffer.is_empty() {
                    // A comment ends the continuation; keep it separated so
                    // comment stripping removes it
                    buffer.push(' ');
                }
                buffer.push_str(line);
                break;
            }

            let start = start?;
            let stripped = strip_comment(&buffer);
            if !stripped.is_empty() {
                return Some((start, stripped.to_string()));
            }
        }
    }
}

/// Remove a `#` comment that starts the line or follows whitespace.
fn strip_comment(line: &str) -> &str {
    let mut prev_is_space = true;
    for (idx, ch) in line.char_indices() {
        if ch == '#' && prev_is_space {
            return line[..idx].trim();
        }
        prev_is_space = ch.is_whitespace();
    }
    line.trim()
}

/// Parse a requirements file into logical lines.
///
/// Fails on constraint directives and on VCS requirements without an
/// `@<ref>#egg=<name>` suffix.
pub fn parse(text: &str) -> Result<Vec<RequirementLine>> {
    parse_lines(text).collect()
}

/// Lazily parse a requirements file, one logical line at a time.
pub fn parse_lines(text: &str) -> impl Iterator<Item = Result<RequirementLine>> + '_ {
    LogicalLines::new(text).map(|(number, line)| parse_line(&line, number))
}

/// Normalized per-line tokens suitable for set comparison.
///
/// VCS requirements are rewritten to `<name>==<ref>`; other lines pass
/// through with whitespace collapsed.
pub fn iter_requirements(text: &str) -> impl Iterator<Item = Result<String>> + '_ {
    parse_lines(text).map(|line| line.map(|l| l.comparable()))
}

/// The set of normalized tokens of a requirements file.
pub fn requirement_set(text: &str) -> Result<BTreeSet<String>> {
    iter_requirements(text).collect()
}

/// Include targets (`-r`) of a requirements file, in declared order.
pub fn includes(text: &str) -> Result<Vec<String>> {
    let mut found = Vec::new();
    for line in parse_lines(text) {
        found.extend(line?.options.requirements);
    }
    Ok(found)
}

/// Parse a single logical line.
fn parse_line(line: &str, line_number: usize) -> Result<RequirementLine> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let split = tokens
        .iter()
        .position(|t| t.starts_with('-'))
        .unwrap_or(tokens.len());
    let (args, option_tokens) = tokens.split_at(split);

    let options = parse_options(option_tokens, line_number)?;
    if let Some(constraint) = options.constraints.first() {
        return Err(Error::parse(
            line_number,
            format!("constraint files are not supported: {constraint}"),
        ));
    }

    let args = args.join(" ");
    let requirement = if let Some(target) = &options.editable {
        Some(classify(target, true, line_number)?)
    } else if !args.is_empty() {
        Some(classify(&args, false, line_number)?)
    } else {
        None
    };

    Ok(RequirementLine {
        line_number,
        raw: tokens.join(" "),
        args,
        options,
        requirement,
    })
}

/// Classify a requirement target as VCS, named package or direct reference.
fn classify(target: &str, editable: bool, line_number: usize) -> Result<Requirement> {
    if vcs::is_vcs(target) {
        let mut found = vcs::extract(target).ok_or_else(|| {
            Error::parse(
                line_number,
                format!("VCS requirement must end with @<ref>#egg=<name>: {target}"),
            )
        })?;
        found.editable |= editable;
        return Ok(Requirement::Vcs(found));
    }

    let name_len = target
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
        .unwrap_or(target.len());
    let looks_like_path = target.starts_with('.') || target.contains('/');

    if name_len == 0 || editable || looks_like_path {
        return Ok(Requirement::Direct {
            target: target.to_string(),
        });
    }

    Ok(Requirement::Package {
        name: target[..name_len].to_string(),
        specifier: target[name_len..].trim().to_string(),
    })
}

/// Parse option tokens (`-r file`, `-rfile`, `--requirement=file`, ...).
///
/// Options outside the known table are kept in [`LineOptions::other`]; they
/// take the next token as value unless it looks like another option.
fn parse_options(tokens: &[&str], line_number: usize) -> Result<LineOptions> {
    let mut options = LineOptions::default();
    let mut idx = 0;

    while idx < tokens.len() {
        let token = tokens[idx];
        idx += 1;

        let (name, inline, is_long) = if let Some(long) = token.strip_prefix("--") {
            match long.split_once('=') {
                Some((name, value)) => (name.to_string(), Some(value), true),
                None => (long.to_string(), None, true),
            }
        } else if let Some(short) = token.strip_prefix('-')
            && let Some(flag) = short.chars().next()
        {
            let rest = &short[flag.len_utf8()..];
            (flag.to_string(), (!rest.is_empty()).then_some(rest), false)
        } else {
            // pip discards positional arguments that follow options
            log::debug!("line {line_number}: ignoring argument after options: {token}");
            continue;
        };

        let known = OPTIONS.iter().find(|s| {
            if is_long {
                s.long == name
            } else {
                s.short.is_some_and(|c| name.starts_with(c))
            }
        });
        let Some(spec) = known else {
            let value = match inline {
                Some(value) => Some(value.to_string()),
                None if idx < tokens.len() && !tokens[idx].starts_with('-') => {
                    idx += 1;
                    Some(tokens[idx - 1].to_string())
                }
                None => None,
            };
            log::debug!("line {line_number}: keeping unrecognized option {token}");
            options.other.push((name, value));
            continue;
        };

        let value = if spec.takes_value {
            match inline {
                Some(value) => Some(value.to_string()),
                None if idx < tokens.len() => {
                    idx += 1;
                    Some(tokens[idx - 1].to_string())
                }
                None => {
                    return Err(Error::parse(
                        line_number,
                        format!("option --{} requires a value", spec.long),
                    ));
                }
            }
        } else if inline.is_some() {
            return Err(Error::parse(
                line_number,
                format!("option --{} does not take a value", spec.long),
            ));
        } else {
            None
        };

        match (spec.kind, value) {
            (OptionKind::Requirement, Some(path)) => options.requirements.push(path),
            (OptionKind::Constraint, Some(path)) => options.constraints.push(path),
            (OptionKind::Editable, Some(target)) => options.editable = Some(target),
            (_, value) => options.other.push((spec.long.to_string(), value)),
        }
    }

    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<String> {
        iter_requirements(text).collect::<Result<_>>().unwrap()
    }

    #[test]
    fn test_referred_and_plain_lines() {
        assert_eq!(
            tokens("-r a.txt\nDjango==1.2.3"),
            vec!["-r a.txt", "Django==1.2.3"]
        );
    }

    #[test]
    fn test_requirements_txt_with_vcs() {
        let text = "\
paramiko==1.16.0
enum34==1.1.2
Jinja2==2.7.3
PyYAML==3.11
git+https://github.com/5monkeys/fabric.git@470a5d91fab350aa7d4aa0f952e1f0eb16ea9d5c#egg=Fabric
git+https://github.com/5monkeys/refabric.git@594b5a5fc9d3e2e184e2580a90866a8dc0aea85d#egg=refabric
";
        assert_eq!(
            tokens(text),
            vec![
                "paramiko==1.16.0",
                "enum34==1.1.2",
                "Jinja2==2.7.3",
                "PyYAML==3.11",
                "Fabric==470a5d91fab350aa7d4aa0f952e1f0eb16ea9d5c",
                "refabric==594b5a5fc9d3e2e184e2580a90866a8dc0aea85d",
            ]
        );
    }

    #[test]
    fn test_editable_vcs_normalizes_and_is_idempotent() {
        let first = tokens("-e git+ssh://host/repo@deadbeef#egg=foo");
        assert_eq!(first, vec!["foo==deadbeef"]);
        assert_eq!(tokens(&first.join("\n")), first);
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let text = "\
# top comment

Django==1.8  # pinned for py2
   # indented comment
requests
";
        assert_eq!(tokens(text), vec!["Django==1.8", "requests"]);
    }

    #[test]
    fn test_hash_inside_token_is_not_a_comment() {
        let lines = parse("git+https://host/r.git@v1#egg=r").unwrap();
        assert_eq!(lines.len(), 1);
        assert!(matches!(lines[0].requirement, Some(Requirement::Vcs(_))));
    }

    #[test]
    fn test_line_continuation() {
        let text = "Django==1.8 \\\n    --hash sha256:abc\nrequests\n";
        let lines = parse(text).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].raw, "Django==1.8 --hash sha256:abc");
        assert_eq!(lines[0].line_number, 1);
        assert_eq!(
            lines[0].options.other,
            vec![("hash".to_string(), Some("sha256:abc".to_string()))]
        );
        assert_eq!(lines[1].line_number, 3);
    }

    #[test]
    fn test_comment_ends_continuation() {
        let text = "Django==1.8 \\\n# comment \\\nrequests";
        let lines = parse(text).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].raw, "Django==1.8");
        assert_eq!(lines[1].raw, "requests");
    }

    #[test]
    fn test_trailing_backslash_at_eof() {
        let lines = parse("requests \\").unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].raw, "requests");
    }

    #[test]
    fn test_include_forms() {
        let text = "-r a.txt\n--requirement b.txt\n--requirement=c.txt\n-rd.txt";
        assert_eq!(includes(text).unwrap(), vec!["a.txt", "b.txt", "c.txt", "d.txt"]);
        assert!(parse(text).unwrap().iter().all(RequirementLine::is_include));
    }

    #[test]
    fn test_package_requirement() {
        let lines = parse("Django[bcrypt]>=1.8,<2 ; python_version < '3'").unwrap();
        assert_eq!(
            lines[0].requirement,
            Some(Requirement::Package {
                name: "Django".to_string(),
                specifier: "[bcrypt]>=1.8,<2 ; python_version < '3'".to_string(),
            })
        );
        assert!(!lines[0].is_include());
    }

    #[test]
    fn test_direct_requirements() {
        let lines = parse("-e .\n./vendor/pkg.tar.gz").unwrap();
        assert_eq!(
            lines[0].requirement,
            Some(Requirement::Direct {
                target: ".".to_string()
            })
        );
        assert_eq!(lines[1].comparable(), "./vendor/pkg.tar.gz");
    }

    #[test]
    fn test_whitespace_is_collapsed() {
        assert_eq!(tokens("Django==1.8    --hash   sha256:abc"), vec!["Django==1.8 --hash sha256:abc"]);
    }

    #[test]
    fn test_flags_and_index_options() {
        let lines = parse("--pre\n-i https://pypi.example.com/simple\n--no-index").unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].options.other, vec![("pre".to_string(), None)]);
        assert_eq!(
            lines[1].options.other,
            vec![("index-url".to_string(), Some("https://pypi.example.com/simple".to_string()))]
        );
        assert!(lines.iter().all(|l| l.requirement.is_none()));
    }

    #[test]
    fn test_constraint_is_rejected() {
        let err = parse("Django\n-c constraints.txt").unwrap_err();
        assert!(err.is_parse());
        assert!(err.to_string().starts_with("line 2:"));

        assert!(parse("--constraint=constraints.txt").is_err());
    }

    #[test]
    fn test_vcs_with_environment_marker() {
        assert_eq!(
            tokens("git+https://h/r.git@v1#egg=r ; python_version < '3'"),
            vec!["r==v1"]
        );
    }

    #[test]
    fn test_vcs_without_ref_is_rejected() {
        assert!(parse("git+https://github.com/org/repo.git#egg=repo").is_err());
        assert!(parse("-e git+https://github.com/org/repo.git@main").is_err());
    }

    #[test]
    fn test_missing_value_and_value_on_flag() {
        assert!(parse("-r").is_err());
        assert!(parse("--pre=yes").is_err());
    }

    #[test]
    fn test_unrecognized_options_are_kept_verbatim() {
        assert_eq!(tokens("-Z\nDjango"), vec!["-Z", "Django"]);
        assert_eq!(
            tokens("--allow-external   foo\n--no-use-wheel -r base.txt"),
            vec!["--allow-external foo", "--no-use-wheel -r base.txt"]
        );

        let lines = parse("--allow-external foo\n--no-use-wheel -r base.txt").unwrap();
        assert_eq!(
            lines[0].options.other,
            vec![("allow-external".to_string(), Some("foo".to_string()))]
        );
        assert!(lines[0].requirement.is_none());
        // A following option is not taken as the value
        assert_eq!(lines[1].options.other, vec![("no-use-wheel".to_string(), None)]);
        assert_eq!(lines[1].includes(), ["base.txt"]);
        assert_eq!(
            parse("--config-settings=key=value").unwrap()[0].options.other,
            vec![("config-settings".to_string(), Some("key=value".to_string()))]
        );
    }

    #[test]
    fn test_iter_requirements_is_lazy_per_line() {
        let mut iter = iter_requirements("Django\n-c constraints.txt\nrequests");
        assert_eq!(iter.next().unwrap().unwrap(), "Django");
        assert!(iter.next().unwrap().is_err());
        assert_eq!(iter.next().unwrap().unwrap(), "requests");
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_requirement_set_ignores_order() {
        let a = requirement_set("Django==1.8\nrequests").unwrap();
        let b = requirement_set("requests\n\nDjango==1.8 # moved").unwrap();
        assert_eq!(a, b);
    }
}
