//! Accessibility classification and usability assessment.
//!
//! Pure functions over verification evidence supplied by the SSRF-safe
//! fetch collaborator. A single resource failing verification degrades
//! that resource only; it is never an error that propagates.

use taxonomy::TopicId;

use crate::config::QualityWeights;
use crate::types::{
    AccessibilityStatus, IssueSeverity, QualitySignals, UsabilityAssessment, UsabilityIssue,
    UsabilityIssueKind, VerificationEvidence, VerificationLevel,
};

/// Classify accessibility from probe evidence.
///
/// Precedence: explicit wall detection (paywall > login > bot > geo >
/// cookie wall) beats the raw HTTP status; a failed probe beats status
/// interpretation; absent evidence is `unknown`, never an error. A 2xx
/// that renders only an empty client-side shell proves nothing about the
/// content and stays `unknown`.
pub fn classify_accessibility(evidence: Option<&VerificationEvidence>) -> AccessibilityStatus {
    let Some(evidence) = evidence else {
        return AccessibilityStatus::Unknown;
    };

    if evidence.walls.paywall {
        return AccessibilityStatus::Paywalled;
    }
    if evidence.walls.login || evidence.walls.age_gate {
        return AccessibilityStatus::RequiresAuth;
    }
    if evidence.walls.bot_check {
        return AccessibilityStatus::BotProtected;
    }
    if evidence.walls.geo_block {
        return AccessibilityStatus::GeoBlocked;
    }
    if evidence.walls.cookie_wall {
        return AccessibilityStatus::BotProtected;
    }

    if evidence.level == VerificationLevel::Failed {
        return AccessibilityStatus::Error;
    }

    match evidence.http_status {
        Some(status) if (200..300).contains(&status) => {
            if evidence.is_soft_404 {
                AccessibilityStatus::NotFound
            } else if evidence.is_js_app_shell {
                AccessibilityStatus::Unknown
            } else {
                AccessibilityStatus::Accessible
            }
        }
        Some(401) | Some(403) => AccessibilityStatus::RequiresAuth,
        Some(404) | Some(410) => AccessibilityStatus::NotFound,
        Some(429) => AccessibilityStatus::RateLimited,
        Some(_) => AccessibilityStatus::Error,
        None => AccessibilityStatus::Unknown,
    }
}

/// Assess whether a verified resource is fit for a learner.
///
/// `recommended` requires the resource to be accessible, meet the quality
/// threshold, and carry no blocking issue. Severity penalties: a blocking
/// issue zeroes the score, each major issue costs 0.2, each minor 0.05.
pub fn assess_usability(
    quality: &QualitySignals,
    accessibility: AccessibilityStatus,
    prerequisites_covered: Vec<TopicId>,
    missing_prerequisites: Vec<TopicId>,
    mut issues: Vec<UsabilityIssue>,
    weights: &QualityWeights,
) -> UsabilityAssessment {
    if !accessibility.is_accessible() {
        issues.push(UsabilityIssue {
            kind: UsabilityIssueKind::Inaccessible,
            severity: IssueSeverity::Blocking,
            detail: format!("resource is not accessible: {accessibility:?}"),
        });
    }
    if !missing_prerequisites.is_empty() {
        issues.push(UsabilityIssue {
            kind: UsabilityIssueKind::MissingPrerequisites,
            severity: IssueSeverity::Major,
            detail: format!("{} prerequisite(s) not covered", missing_prerequisites.len()),
        });
    }

    let has_blocking = issues.iter().any(|i| i.severity == IssueSeverity::Blocking);

    let score = if has_blocking {
        0.0
    } else {
        let penalty: f32 = issues
            .iter()
            .map(|i| match i.severity {
                IssueSeverity::Blocking => 1.0,
                IssueSeverity::Major => 0.2,
                IssueSeverity::Minor => 0.05,
            })
            .sum();
        (quality.composite - penalty).clamp(0.0, 1.0)
    };

    let covered = prerequisites_covered.len();
    let missing = missing_prerequisites.len();
    let audience_match = if covered + missing == 0 {
        1.0
    } else {
        covered as f32 / (covered + missing) as f32
    };

    let mut strengths = Vec::new();
    if quality.popularity >= 0.8 {
        strengths.push("widely used".to_string());
    }
    if quality.recency >= 0.8 {
        strengths.push("recently published or updated".to_string());
    }
    if quality.completeness >= 0.8 {
        strengths.push("rich metadata".to_string());
    }

    let recommended = accessibility.is_accessible()
        && quality.composite >= weights.recommended_threshold
        && !has_blocking;

    UsabilityAssessment {
        score,
        recommended,
        issues,
        strengths,
        audience_match,
        prerequisites_covered,
        missing_prerequisites,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContentWalls, QualityDetails};

    fn evidence(status: Option<u16>) -> VerificationEvidence {
        VerificationEvidence {
            http_status: status,
            response_time_ms: Some(120),
            content_type: Some("text/html".to_string()),
            content_length: Some(4_096),
            uses_https: true,
            valid_certificate: true,
            walls: ContentWalls::default(),
            is_soft_404: false,
            is_js_app_shell: false,
            redirect_chain: vec![],
            final_url: None,
            level: VerificationLevel::High,
        }
    }

    fn quality(composite: f32) -> QualitySignals {
        QualitySignals {
            popularity: composite,
            recency: composite,
            authority: composite,
            completeness: composite,
            composite,
            details: QualityDetails::default(),
        }
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            classify_accessibility(Some(&evidence(Some(200)))),
            AccessibilityStatus::Accessible
        );
        assert_eq!(
            classify_accessibility(Some(&evidence(Some(401)))),
            AccessibilityStatus::RequiresAuth
        );
        assert_eq!(
            classify_accessibility(Some(&evidence(Some(403)))),
            AccessibilityStatus::RequiresAuth
        );
        assert_eq!(
            classify_accessibility(Some(&evidence(Some(404)))),
            AccessibilityStatus::NotFound
        );
        assert_eq!(
            classify_accessibility(Some(&evidence(Some(410)))),
            AccessibilityStatus::NotFound
        );
        assert_eq!(
            classify_accessibility(Some(&evidence(Some(429)))),
            AccessibilityStatus::RateLimited
        );
        assert_eq!(
            classify_accessibility(Some(&evidence(Some(500)))),
            AccessibilityStatus::Error
        );
        assert_eq!(classify_accessibility(None), AccessibilityStatus::Unknown);
    }

    #[test]
    fn test_walls_beat_status() {
        let mut paywalled = evidence(Some(200));
        paywalled.walls.paywall = true;
        assert_eq!(
            classify_accessibility(Some(&paywalled)),
            AccessibilityStatus::Paywalled
        );

        // Paywall outranks login when both are flagged.
        let mut both = evidence(Some(200));
        both.walls.paywall = true;
        both.walls.login = true;
        assert_eq!(
            classify_accessibility(Some(&both)),
            AccessibilityStatus::Paywalled
        );

        let mut geo = evidence(Some(403));
        geo.walls.geo_block = true;
        assert_eq!(
            classify_accessibility(Some(&geo)),
            AccessibilityStatus::GeoBlocked
        );
    }

    #[test]
    fn test_cookie_wall_blocks() {
        let mut walled = evidence(Some(200));
        walled.walls.cookie_wall = true;
        assert_eq!(
            classify_accessibility(Some(&walled)),
            AccessibilityStatus::BotProtected
        );

        // Any harder wall outranks the cookie wall.
        walled.walls.paywall = true;
        assert_eq!(
            classify_accessibility(Some(&walled)),
            AccessibilityStatus::Paywalled
        );
    }

    #[test]
    fn test_js_app_shell_is_unknown() {
        let mut shell = evidence(Some(200));
        shell.is_js_app_shell = true;
        assert_eq!(
            classify_accessibility(Some(&shell)),
            AccessibilityStatus::Unknown
        );

        // Unverifiable content is never recommended.
        let assessed = assess_usability(
            &quality(0.9),
            AccessibilityStatus::Unknown,
            vec![],
            vec![],
            vec![],
            &QualityWeights::default(),
        );
        assert!(!assessed.recommended);
    }

    #[test]
    fn test_soft_404_is_not_found() {
        let mut soft = evidence(Some(200));
        soft.is_soft_404 = true;
        assert_eq!(
            classify_accessibility(Some(&soft)),
            AccessibilityStatus::NotFound
        );
    }

    #[test]
    fn test_failed_probe_is_error() {
        let mut failed = evidence(None);
        failed.level = VerificationLevel::Failed;
        assert_eq!(
            classify_accessibility(Some(&failed)),
            AccessibilityStatus::Error
        );
    }

    #[test]
    fn test_recommended_requires_all_three() {
        let weights = QualityWeights::default();

        let good = assess_usability(
            &quality(0.8),
            AccessibilityStatus::Accessible,
            vec![],
            vec![],
            vec![],
            &weights,
        );
        assert!(good.recommended);
        assert!(good.issues.is_empty());

        let low_quality = assess_usability(
            &quality(0.4),
            AccessibilityStatus::Accessible,
            vec![],
            vec![],
            vec![],
            &weights,
        );
        assert!(!low_quality.recommended);

        let walled = assess_usability(
            &quality(0.9),
            AccessibilityStatus::Paywalled,
            vec![],
            vec![],
            vec![],
            &weights,
        );
        assert!(!walled.recommended);
        assert_eq!(walled.score, 0.0);

        let blocked = assess_usability(
            &quality(0.9),
            AccessibilityStatus::Accessible,
            vec![],
            vec![],
            vec![UsabilityIssue {
                kind: UsabilityIssueKind::Outdated,
                severity: IssueSeverity::Blocking,
                detail: "covers a long-dead major version".to_string(),
            }],
            &weights,
        );
        assert!(!blocked.recommended);
    }

    #[test]
    fn test_severity_penalties() {
        let weights = QualityWeights::default();
        let minor = UsabilityIssue {
            kind: UsabilityIssueKind::LowProductionQuality,
            severity: IssueSeverity::Minor,
            detail: "audio hiss".to_string(),
        };
        let assessed = assess_usability(
            &quality(0.8),
            AccessibilityStatus::Accessible,
            vec![],
            vec![],
            vec![minor],
            &weights,
        );
        assert!((assessed.score - 0.75).abs() < 1e-6);
        // A minor issue alone does not block the recommendation.
        assert!(assessed.recommended);
    }

    #[test]
    fn test_missing_prerequisites_lower_audience_match() {
        let weights = QualityWeights::default();
        let covered = vec![TopicId::parse("concept:memory").unwrap()];
        let missing = vec![
            TopicId::parse("concept:pointers").unwrap(),
            TopicId::parse("language:rust").unwrap(),
        ];

        let assessed = assess_usability(
            &quality(0.9),
            AccessibilityStatus::Accessible,
            covered,
            missing,
            vec![],
            &weights,
        );
        assert!((assessed.audience_match - 1.0 / 3.0).abs() < 1e-6);
        assert!(assessed
            .issues
            .iter()
            .any(|i| i.kind == UsabilityIssueKind::MissingPrerequisites));
        // Major issue costs 0.2.
        assert!((assessed.score - 0.7).abs() < 1e-6);
    }
}
