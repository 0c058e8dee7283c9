// migrator-runner/src/routines.rs
// ============================================================================
// Module: Routine Translator (C6)
// Description: Risk analysis, stub generation, and safe-subset translation
//              for stored routines and triggers.
// Purpose: Turn a source-dialect routine/trigger body into either a risk
//          report, a stub, or a translated target-dialect body, under an
//          explicit capability mode.
// Dependencies: migrator-core
// ============================================================================

//! ## Overview
//! The translator never guesses: a routine either falls within the fixed,
//! documented safe subset and gets rewritten mechanically, or it gets a
//! stub and a recorded reason. Triggers are classified once, at
//! introspection time, by the same conservative subset predicate, and the
//! data-copy path never reads `supported_subset` or `unsupported_reason`
//! afterward — only this module and the report generator do.

// ============================================================================
// SECTION: Imports
// ============================================================================

use migrator_core::Dialect;
use migrator_core::RoutineIr;
use migrator_core::TriggerEvent;
use migrator_core::TriggerIr;
use migrator_core::TriggerLevel;
use migrator_core::TriggerTiming;

// ============================================================================
// SECTION: Capability mode
// ============================================================================

/// User-selected handling mode for stored routines and triggers.
///
/// This is a superset of [`migrator_config::RoutinesMode`]: `Translate`
/// maps onto `SubsetTranslate` here, which automatically falls back to
/// `Stub` per routine when translation fails, so every outcome the
/// specification names stays reachable through the three-variant config
/// enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutineCapabilityMode {
    /// Skip routines and triggers entirely; record each as a limitation.
    None,
    /// Run risk analysis only; emit no code.
    Analyze,
    /// Emit a stub for every routine, unconditionally.
    Stub,
    /// Attempt the safe-subset rewrite; fall back to a stub per routine on
    /// failure, with the reason recorded in that routine's `issues`.
    SubsetTranslate,
}

impl From<migrator_config::RoutinesMode> for RoutineCapabilityMode {
    fn from(mode: migrator_config::RoutinesMode) -> Self {
        match mode {
            migrator_config::RoutinesMode::Skip => Self::None,
            migrator_config::RoutinesMode::Analyze => Self::Analyze,
            migrator_config::RoutinesMode::Translate => Self::SubsetTranslate,
        }
    }
}

// ============================================================================
// SECTION: Outcome
// ============================================================================

/// Disposition of one routine or trigger after translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationOutcome {
    /// The object was skipped without analysis.
    Skipped,
    /// Risk analysis ran; no code was generated.
    AnalyzedOnly,
    /// A stub was generated.
    Stubbed,
    /// The body was mechanically translated.
    Translated,
}

/// Result of running one routine through the translator.
#[derive(Debug, Clone)]
pub struct RoutineTranslation {
    /// Routine name.
    pub name: String,
    /// Final disposition.
    pub outcome: TranslationOutcome,
    /// Generated SQL, present for `Stubbed` and `Translated` outcomes.
    pub generated_code: Option<String>,
    /// Non-fatal warnings accumulated during translation.
    pub warnings: Vec<String>,
    /// Errors that caused a fallback to a stub (never fatal to the run).
    pub errors: Vec<String>,
}

// ============================================================================
// SECTION: Risk analysis
// ============================================================================

const RISK_DYNAMIC_SQL: u8 = 50;
const RISK_CURSOR: u8 = 30;
const RISK_VENDOR_PACKAGE: u8 = 40;
const RISK_EXCEPTION_HANDLING: u8 = 20;
const RISK_PRAGMA_HINT: u8 = 20;
const SAFE_RISK_THRESHOLD: u8 = 20;

/// Scores a routine body's translation risk and appends issues describing
/// each rule that fired. The score saturates at `100`.
///
/// # Errors
///
/// Never fails; risk analysis is a pure, total function of the body text.
#[must_use]
pub fn analyze_risk(body: &str) -> (u8, Vec<String>) {
    let upper = body.to_ascii_uppercase();
    let mut score: u16 = 0;
    let mut issues = Vec::new();

    if upper.contains("EXECUTE IMMEDIATE") || upper.contains("EXEC(") || upper.contains("EXEC (")
    {
        score += u16::from(RISK_DYNAMIC_SQL);
        issues.push("dynamic SQL (EXECUTE IMMEDIATE/EXEC) increases translation risk".to_string());
    }
    if upper.contains("CURSOR") {
        score += u16::from(RISK_CURSOR);
        issues.push("explicit cursor usage increases translation risk".to_string());
    }
    if contains_vendor_package(&upper) {
        score += u16::from(RISK_VENDOR_PACKAGE);
        issues.push("vendor system package reference (DBMS_*/UTL_*/sp_*) is not portable".to_string());
    }
    if upper.contains("EXCEPTION") && (upper.contains("WHEN") || upper.contains("RAISE")) {
        score += u16::from(RISK_EXCEPTION_HANDLING);
        issues.push("complex exception handling increases translation risk".to_string());
    }
    if body.contains("/*+") || upper.contains("PRAGMA") {
        score += u16::from(RISK_PRAGMA_HINT);
        issues.push("optimizer hints or pragmas are dialect-specific and dropped".to_string());
    }

    (u8::try_from(score.min(100)).unwrap_or(100), issues)
}

fn contains_vendor_package(upper: &str) -> bool {
    ["DBMS_", "UTL_", "SP_"].iter().any(|prefix| upper.contains(prefix))
}

/// Returns `true` when a routine's risk score falls at or below the safe
/// threshold for subset translation.
#[must_use]
pub const fn is_safe_risk(score: u8) -> bool {
    score <= SAFE_RISK_THRESHOLD
}

// ============================================================================
// SECTION: Fixed rewrite table
// ============================================================================

/// One fixed dialect-builtin rewrite, applied verbatim wherever its source
/// pattern appears as a whole word in a routine body.
struct Rewrite {
    find: &'static str,
    replace: &'static str,
}

const REWRITES: &[Rewrite] = &[
    Rewrite {
        find: "SYSDATE",
        replace: "CURRENT_TIMESTAMP",
    },
    Rewrite {
        find: "SYSTIMESTAMP",
        replace: "CURRENT_TIMESTAMP",
    },
    Rewrite {
        find: "FROM DUAL",
        replace: "",
    },
];

/// Applies the fixed rewrite table to `body`, matching case-insensitively
/// on whole-word boundaries so e.g. `SYSDATETIME` is left untouched by the
/// `SYSDATE` rule. Also rewrites `NVL`/`NVL2` calls (arity-preserving, so a
/// whole-word rename is not enough) and single-argument `TRUNC(d)` calls
/// into the target dialect's date-truncation idiom, when one is known.
#[must_use]
pub fn apply_fixed_rewrites(body: &str, target_dialect: &Dialect) -> String {
    let mut result = body.to_string();
    for rewrite in REWRITES {
        result = replace_whole_word_ci(&result, rewrite.find, rewrite.replace);
    }
    result = rewrite_nvl2(&result);
    result = rewrite_nvl(&result);
    result = rewrite_trunc(&result, target_dialect);
    result
}

/// Rewrites `NVL(a, b)` to `COALESCE(a, b)`. Both take exactly two
/// arguments and the same null-coalescing semantics, so this is a plain
/// function rename rather than a restructuring rewrite.
fn rewrite_nvl(body: &str) -> String {
    rewrite_paren_calls(body, "NVL", |args| match args {
        [left, right] => Some(format!("COALESCE({left}, {right})")),
        _ => None,
    })
}

/// Rewrites `NVL2(a, b, c)` to `CASE WHEN a IS NOT NULL THEN b ELSE c END`,
/// the standard SQL equivalent of Oracle's three-argument null test.
fn rewrite_nvl2(body: &str) -> String {
    rewrite_paren_calls(body, "NVL2", |args| match args {
        [cond, when_not_null, when_null] => {
            Some(format!("CASE WHEN {cond} IS NOT NULL THEN {when_not_null} ELSE {when_null} END"))
        }
        _ => None,
    })
}

/// Rewrites a single-argument `TRUNC(d)` date truncation into the target
/// dialect's idiom. Two-argument numeric `TRUNC(n, places)` calls are left
/// untouched: the rewrite only concerns the date-truncation builtin.
fn rewrite_trunc(body: &str, target_dialect: &Dialect) -> String {
    rewrite_paren_calls(body, "TRUNC", |args| match (args, target_dialect) {
        ([arg], &Dialect::Postgresql | &Dialect::Duckdb) => Some(format!("DATE_TRUNC('day', {arg})")),
        ([arg], &Dialect::Mysql) => Some(format!("DATE({arg})")),
        _ => None,
    })
}

/// Finds whole-word calls to `name(...)` in `body` and replaces each with
/// `build`'s output, when `build` recognizes the parsed argument list.
/// Calls `build` does not recognize (wrong arity, usually) are left
/// untouched in place.
fn rewrite_paren_calls(body: &str, name: &str, build: impl Fn(&[String]) -> Option<String>) -> String {
    let name_upper = name.to_ascii_uppercase();
    let body_upper = body.to_ascii_uppercase();
    let mut out = String::with_capacity(body.len());
    let mut cursor = 0usize;

    while let Some(relative) = body_upper[cursor..].find(&name_upper) {
        let start = cursor + relative;
        let after_name = start + name.len();
        let before_ok = start == 0 || !is_word_byte(body.as_bytes()[start - 1]);
        let paren_ok = body.as_bytes().get(after_name) == Some(&b'(');

        if before_ok && paren_ok {
            if let Some(close) = find_matching_paren(body, after_name) {
                let args = split_top_level_commas(&body[after_name + 1..close]);
                if let Some(replacement) = build(&args) {
                    out.push_str(&body[cursor..start]);
                    out.push_str(&replacement);
                    cursor = close + 1;
                    continue;
                }
            }
        }
        out.push_str(&body[cursor..=start]);
        cursor = start + 1;
    }
    out.push_str(&body[cursor..]);
    out
}

/// Returns the index of the `)` matching the `(` at `open_idx`, accounting
/// for nested parentheses.
fn find_matching_paren(body: &str, open_idx: usize) -> Option<usize> {
    let bytes = body.as_bytes();
    if bytes.get(open_idx) != Some(&b'(') {
        return None;
    }
    let mut depth = 0i32;
    for (offset, &byte) in bytes[open_idx..].iter().enumerate() {
        match byte {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open_idx + offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// Splits `s` on top-level commas (ignoring commas nested inside
/// parentheses), trimming whitespace from each part.
fn split_top_level_commas(s: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;
    for (idx, ch) in s.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(s[start..idx].trim().to_string());
                start = idx + ch.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(s[start..].trim().to_string());
    parts
}

/// Case-insensitive whole-word replacement without a regex engine: a match
/// only counts when neither the byte before nor the byte after is
/// alphanumeric or an underscore.
fn replace_whole_word_ci(haystack: &str, needle: &str, replacement: &str) -> String {
    if needle.is_empty() {
        return haystack.to_string();
    }
    let haystack_upper = haystack.to_ascii_uppercase();
    let needle_upper = needle.to_ascii_uppercase();
    let mut out = String::with_capacity(haystack.len());
    let mut cursor = 0usize;

    while let Some(relative) = haystack_upper[cursor..].find(&needle_upper) {
        let start = cursor + relative;
        let end = start + needle.len();
        let before_ok = start == 0 || !is_word_byte(haystack.as_bytes()[start - 1]);
        let after_ok = end >= haystack.len() || !is_word_byte(haystack.as_bytes()[end]);
        if before_ok && after_ok {
            out.push_str(&haystack[cursor..start]);
            out.push_str(replacement);
            cursor = end;
        } else {
            out.push_str(&haystack[cursor..=start]);
            cursor = start + 1;
        }
    }
    out.push_str(&haystack[cursor..]);
    out
}

const fn is_word_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

/// Detects structural patterns outside the documented safe subset: loops,
/// cursors, or dynamic SQL. A routine containing any of these can never be
/// subset-translated, regardless of risk score.
fn has_unsupported_structure(upper_body: &str) -> Option<&'static str> {
    if upper_body.contains("EXECUTE IMMEDIATE") || upper_body.contains("EXEC ") {
        return Some("body uses dynamic SQL");
    }
    if upper_body.contains("CURSOR") {
        return Some("body declares an explicit cursor");
    }
    if upper_body.contains("LOOP") || upper_body.contains("WHILE ") || upper_body.contains("FOR ") {
        return Some("body contains a loop construct");
    }
    None
}

// ============================================================================
// SECTION: Routine translation
// ============================================================================

/// Runs one routine through the translator under `mode`, targeting
/// `target_dialect` for the stub signature.
///
/// # Errors
///
/// Never returns `Err`; translation failures are represented as a
/// [`TranslationOutcome::Stubbed`] result with a populated `errors` list,
/// matching the specification's non-fatal `RoutineTranslationError`
/// semantics.
#[must_use]
pub fn translate_routine(
    routine: &RoutineIr,
    mode: RoutineCapabilityMode,
    target_dialect: &Dialect,
) -> RoutineTranslation {
    let (risk_score, risk_issues) = analyze_risk(&routine.body);

    match mode {
        RoutineCapabilityMode::None => RoutineTranslation {
            name: routine.name.clone(),
            outcome: TranslationOutcome::Skipped,
            generated_code: None,
            warnings: Vec::new(),
            errors: Vec::new(),
        },
        RoutineCapabilityMode::Analyze => RoutineTranslation {
            name: routine.name.clone(),
            outcome: TranslationOutcome::AnalyzedOnly,
            generated_code: None,
            warnings: risk_issues,
            errors: Vec::new(),
        },
        RoutineCapabilityMode::Stub => RoutineTranslation {
            name: routine.name.clone(),
            outcome: TranslationOutcome::Stubbed,
            generated_code: Some(stub_routine(routine, target_dialect)),
            warnings: risk_issues,
            errors: Vec::new(),
        },
        RoutineCapabilityMode::SubsetTranslate => {
            subset_translate(routine, target_dialect, risk_score, risk_issues)
        }
    }
}

fn subset_translate(
    routine: &RoutineIr,
    target_dialect: &Dialect,
    risk_score: u8,
    risk_issues: Vec<String>,
) -> RoutineTranslation {
    let upper = routine.body.to_ascii_uppercase();
    if let Some(reason) = has_unsupported_structure(&upper) {
        return RoutineTranslation {
            name: routine.name.clone(),
            outcome: TranslationOutcome::Stubbed,
            generated_code: Some(stub_routine(routine, target_dialect)),
            warnings: risk_issues,
            errors: vec![format!("falling back to stub: {reason}")],
        };
    }
    if !is_safe_risk(risk_score) {
        return RoutineTranslation {
            name: routine.name.clone(),
            outcome: TranslationOutcome::Stubbed,
            generated_code: Some(stub_routine(routine, target_dialect)),
            warnings: risk_issues,
            errors: vec![format!(
                "falling back to stub: risk score {risk_score} exceeds safe threshold {SAFE_RISK_THRESHOLD}"
            )],
        };
    }
    if routine.body.to_ascii_uppercase().contains("DECODE(") {
        return RoutineTranslation {
            name: routine.name.clone(),
            outcome: TranslationOutcome::Stubbed,
            generated_code: Some(stub_routine(routine, target_dialect)),
            warnings: risk_issues,
            errors: vec![
                "falling back to stub: DECODE has no unambiguous 1:1 CASE rewrite".to_string(),
            ],
        };
    }

    let translated = apply_fixed_rewrites(&routine.body, target_dialect);
    RoutineTranslation {
        name: routine.name.clone(),
        outcome: TranslationOutcome::Translated,
        generated_code: Some(translated),
        warnings: risk_issues,
        errors: Vec::new(),
    }
}

fn stub_routine(routine: &RoutineIr, target_dialect: &Dialect) -> String {
    let kind = if routine.is_function { "FUNCTION" } else { "PROCEDURE" };
    format!(
        "-- stub generated for {target_dialect} target; original body not migrated\n\
         CREATE {kind} {name}(...) AS\n\
         BEGIN\n\
         \tRAISE EXCEPTION 'unimplemented: {name} was not translated';\n\
         END;",
        kind = kind,
        name = routine.name,
        target_dialect = target_dialect,
    )
}

// ============================================================================
// SECTION: Trigger subset classification
// ============================================================================

/// Classifies `trigger` against the documented safe-rewrite subset: `BEFORE
/// INSERT` or `BEFORE UPDATE`, row-level, body limited to in-place column
/// normalization with built-in string/math functions.
///
/// Returns the updated trigger with `supported_subset` and
/// `unsupported_reason` set; every other field is unchanged.
#[must_use]
pub fn classify_trigger(mut trigger: TriggerIr) -> TriggerIr {
    match unsupported_reason(&trigger) {
        Some(reason) => {
            trigger.supported_subset = false;
            trigger.unsupported_reason = Some(reason);
        }
        None => {
            trigger.supported_subset = true;
            trigger.unsupported_reason = None;
        }
    }
    trigger
}

fn unsupported_reason(trigger: &TriggerIr) -> Option<String> {
    if trigger.timing != TriggerTiming::Before {
        return Some(format!(
            "unsupported: timing is {:?}, only BEFORE triggers are in the safe subset",
            trigger.timing
        ));
    }
    if trigger.level != TriggerLevel::Row {
        return Some("unsupported: STATEMENT-level triggers are not in the safe subset".to_string());
    }
    if trigger.events.contains(&TriggerEvent::Delete) || trigger.events.len() > 1 {
        return Some(
            "unsupported: only a single INSERT or UPDATE event is in the safe subset".to_string(),
        );
    }

    let upper = trigger.body.to_ascii_uppercase();
    const ALLOWED_FUNCTIONS: [&str; 5] = ["UPPER", "LOWER", "TRIM", "ROUND", "COALESCE"];
    let has_dml = ["INSERT ", "UPDATE ", "DELETE ", "SELECT "]
        .iter()
        .any(|keyword| upper.contains(keyword));
    if has_dml {
        return Some("unsupported: body contains DML, not in-place column normalization".to_string());
    }
    if upper.contains("LOOP") || upper.contains("WHILE ") || upper.contains("FOR ") {
        return Some("unsupported: body contains a loop construct".to_string());
    }
    let mentions_disallowed_call = upper
        .split(|c: char| !c.is_ascii_alphanumeric() && c != '_')
        .filter(|token| !token.is_empty())
        .any(|token| {
            token.chars().next().is_some_and(char::is_alphabetic)
                && !ALLOWED_FUNCTIONS.contains(&token)
                && is_probably_function_call(&upper, token)
        });
    if mentions_disallowed_call {
        return Some(
            "unsupported: body calls a function outside the documented normalization subset"
                .to_string(),
        );
    }

    None
}

fn is_probably_function_call(upper_body: &str, token: &str) -> bool {
    let pattern = format!("{token}(");
    upper_body.contains(&pattern) && !matches!(token, "NEW" | "OLD" | "SET" | "BEGIN" | "END" | "IF" | "THEN" | "ELSE")
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use migrator_core::ArgumentMode;
    use migrator_core::RoutineArgument;
    use migrator_core::TableName;
    use migrator_core::TypeInfo;

    fn sample_routine(body: &str) -> RoutineIr {
        RoutineIr {
            name: "normalize_email".to_string(),
            is_function: true,
            arguments: vec![RoutineArgument {
                name: "raw".to_string(),
                type_info: TypeInfo {
                    raw: "VARCHAR2(255)".to_string(),
                    ir_kind: migrator_core::IrKind::Text,
                    nullable: true,
                },
                mode: ArgumentMode::In,
                default_expr: None,
            }],
            return_type: None,
            body: body.to_string(),
            source_dialect: "oracle".to_string(),
            dependencies: Vec::new(),
            risk_score: 0,
            issues: Vec::new(),
        }
    }

    fn sample_trigger(timing: TriggerTiming, level: TriggerLevel, body: &str) -> TriggerIr {
        TriggerIr {
            name: "trg_normalize".to_string(),
            table: TableName::new("customers"),
            timing,
            events: vec![TriggerEvent::Insert],
            level,
            body: body.to_string(),
            is_enabled: true,
            supported_subset: false,
            unsupported_reason: None,
        }
    }

    #[test]
    fn dynamic_sql_scores_high_risk() {
        let (score, issues) = analyze_risk("BEGIN EXECUTE IMMEDIATE 'DROP TABLE x'; END;");
        assert!(score >= RISK_DYNAMIC_SQL);
        assert!(!issues.is_empty());
    }

    #[test]
    fn combined_rules_saturate_at_one_hundred() {
        let body = "BEGIN EXECUTE IMMEDIATE v; DECLARE CURSOR c IS SELECT 1 FROM dual; \
                     DBMS_OUTPUT.PUT_LINE('x'); EXCEPTION WHEN OTHERS THEN RAISE; END; /*+ hint */";
        let (score, _) = analyze_risk(body);
        assert_eq!(score, 100);
    }

    #[test]
    fn fixed_rewrites_replace_whole_words_only() {
        let rewritten = apply_fixed_rewrites("SELECT SYSDATE FROM DUAL", &Dialect::Postgresql);
        assert_eq!(rewritten, "SELECT CURRENT_TIMESTAMP ");
    }

    #[test]
    fn fixed_rewrites_do_not_match_substrings() {
        let rewritten = apply_fixed_rewrites("SELECT SYSDATETIME_COL FROM widgets", &Dialect::Postgresql);
        assert_eq!(rewritten, "SELECT SYSDATETIME_COL FROM widgets");
    }

    #[test]
    fn nvl_rewrites_to_coalesce_preserving_arguments() {
        let rewritten = apply_fixed_rewrites("SELECT NVL(a, b) FROM widgets", &Dialect::Postgresql);
        assert_eq!(rewritten, "SELECT COALESCE(a, b) FROM widgets");
    }

    #[test]
    fn nvl_rewrite_does_not_touch_nvl2() {
        let rewritten = apply_fixed_rewrites("SELECT NVL2(a, b, c) FROM widgets", &Dialect::Postgresql);
        assert!(rewritten.contains("CASE WHEN a IS NOT NULL THEN b ELSE c END"));
        assert!(!rewritten.contains("NVL2"));
    }

    #[test]
    fn trunc_rewrites_per_target_dialect() {
        let postgres = apply_fixed_rewrites("SELECT TRUNC(created_at) FROM widgets", &Dialect::Postgresql);
        assert_eq!(postgres, "SELECT DATE_TRUNC('day', created_at) FROM widgets");

        let mysql = apply_fixed_rewrites("SELECT TRUNC(created_at) FROM widgets", &Dialect::Mysql);
        assert_eq!(mysql, "SELECT DATE(created_at) FROM widgets");
    }

    #[test]
    fn trunc_with_two_arguments_is_left_untouched() {
        let rewritten = apply_fixed_rewrites("SELECT TRUNC(amount, 2) FROM widgets", &Dialect::Postgresql);
        assert_eq!(rewritten, "SELECT TRUNC(amount, 2) FROM widgets");
    }

    #[test]
    fn safe_routine_is_translated() {
        let routine = sample_routine("BEGIN RETURN UPPER(raw); END;");
        let result = translate_routine(&routine, RoutineCapabilityMode::SubsetTranslate, &Dialect::Postgresql);
        assert_eq!(result.outcome, TranslationOutcome::Translated);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn risky_routine_falls_back_to_stub() {
        let routine = sample_routine("BEGIN EXECUTE IMMEDIATE sql_text; END;");
        let result = translate_routine(&routine, RoutineCapabilityMode::SubsetTranslate, &Dialect::Postgresql);
        assert_eq!(result.outcome, TranslationOutcome::Stubbed);
        assert!(!result.errors.is_empty());
    }

    #[test]
    fn decode_always_falls_back_to_stub() {
        let routine = sample_routine("BEGIN RETURN DECODE(raw, 'a', 1, 0); END;");
        let result = translate_routine(&routine, RoutineCapabilityMode::SubsetTranslate, &Dialect::Postgresql);
        assert_eq!(result.outcome, TranslationOutcome::Stubbed);
    }

    #[test]
    fn before_insert_row_level_normalization_is_supported() {
        let trigger = sample_trigger(TriggerTiming::Before, TriggerLevel::Row, "SET NEW.email = LOWER(NEW.email);");
        let classified = classify_trigger(trigger);
        assert!(classified.supported_subset);
        assert!(classified.unsupported_reason.is_none());
    }

    #[test]
    fn after_trigger_is_unsupported() {
        let trigger = sample_trigger(TriggerTiming::After, TriggerLevel::Row, "SET NEW.email = LOWER(NEW.email);");
        let classified = classify_trigger(trigger);
        assert!(!classified.supported_subset);
        assert!(classified.unsupported_reason.is_some());
    }

    #[test]
    fn trigger_with_dml_body_is_unsupported() {
        let trigger = sample_trigger(
            TriggerTiming::Before,
            TriggerLevel::Row,
            "INSERT INTO audit_log VALUES (NEW.id);",
        );
        let classified = classify_trigger(trigger);
        assert!(!classified.supported_subset);
        let reason = classified.unsupported_reason.expect("reason present");
        assert!(reason.contains("DML"));
    }
}
