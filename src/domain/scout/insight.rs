//! 스카우트 통계 계산
//!
//! 상태별 피치 수, 창업자 성별 비율, 평균 나이, NPS 버킷을 한 곳에서 계산합니다.

use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::pitch::entity::pitch::PitchStatus;
use crate::domain::user::entity::user::Gender;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: PitchStatus,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenderShare {
    /// 성별 미입력은 null
    pub gender: Option<Gender>,
    pub count: u64,
    /// 소수점 첫째 자리까지의 백분율
    pub percentage: f64,
}

/// believe rating 기반 NPS 요약
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NpsSummary {
    /// 9~10점
    pub promoters: u64,
    /// 7~8점
    pub passives: u64,
    /// 0~6점
    pub detractors: u64,
    pub total: u64,
    /// %promoters - %detractors (반올림), 평가가 없으면 null
    pub score: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScoutInsights {
    pub scout_id: i64,
    pub total_pitches: u64,
    pub status_counts: Vec<StatusCount>,
    pub gender_ratio: Vec<GenderShare>,
    pub average_founder_age: Option<f64>,
    pub nps: NpsSummary,
}

/// 창업자 한 명의 통계 입력
#[derive(Debug, Clone, Copy)]
pub struct FounderSample {
    pub gender: Option<Gender>,
    pub age: Option<u32>,
}

pub fn count_statuses(statuses: &[PitchStatus]) -> Vec<StatusCount> {
    let mut counts: Vec<StatusCount> = Vec::new();
    for status in statuses {
        match counts.iter_mut().find(|c| c.status == *status) {
            Some(entry) => entry.count += 1,
            None => counts.push(StatusCount {
                status: *status,
                count: 1,
            }),
        }
    }
    counts
}

pub fn gender_ratio(founders: &[FounderSample]) -> Vec<GenderShare> {
    let total = founders.len() as f64;
    let mut buckets: BTreeMap<u8, (Option<Gender>, u64)> = BTreeMap::new();
    for founder in founders {
        let key = match founder.gender {
            Some(Gender::Male) => 0,
            Some(Gender::Female) => 1,
            Some(Gender::Other) => 2,
            None => 3,
        };
        buckets.entry(key).or_insert((founder.gender, 0)).1 += 1;
    }

    buckets
        .into_values()
        .map(|(gender, count)| GenderShare {
            gender,
            count,
            percentage: round1(count as f64 * 100.0 / total),
        })
        .collect()
}

pub fn average_age(founders: &[FounderSample]) -> Option<f64> {
    let ages: Vec<u32> = founders.iter().filter_map(|f| f.age).collect();
    if ages.is_empty() {
        return None;
    }
    let sum: u64 = ages.iter().map(|a| *a as u64).sum();
    Some(round1(sum as f64 / ages.len() as f64))
}

pub fn nps(ratings: &[i32]) -> NpsSummary {
    let promoters = ratings.iter().filter(|r| **r >= 9).count() as u64;
    let passives = ratings.iter().filter(|r| (7..=8).contains(*r)).count() as u64;
    let detractors = ratings.iter().filter(|r| **r <= 6).count() as u64;
    let total = ratings.len() as u64;

    let score = (total > 0).then(|| {
        let diff = promoters as f64 - detractors as f64;
        (diff * 100.0 / total as f64).round() as i32
    });

    NpsSummary {
        promoters,
        passives,
        detractors,
        total,
        score,
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nps_should_subtract_detractor_share_from_promoter_share() {
        // Arrange
        let ratings = [10, 9, 8, 3];

        // Act
        let summary = nps(&ratings);

        // Assert
        assert_eq!(summary.promoters, 2);
        assert_eq!(summary.passives, 1);
        assert_eq!(summary.detractors, 1);
        assert_eq!(summary.score, Some(25));
    }

    #[test]
    fn nps_should_round_to_nearest_integer() {
        // 1 promoter, 2 passives: 33.33...
        assert_eq!(nps(&[9, 7, 8]).score, Some(33));
        // 2 promoters, 1 passive: 66.66...
        assert_eq!(nps(&[10, 10, 7]).score, Some(67));
    }

    #[test]
    fn nps_without_ratings_should_have_no_score() {
        let summary = nps(&[]);

        assert_eq!(summary.total, 0);
        assert_eq!(summary.score, None);
    }

    #[test]
    fn bucket_edges_should_follow_rating_bands() {
        let summary = nps(&[6, 7, 8, 9]);

        assert_eq!(
            (summary.detractors, summary.passives, summary.promoters),
            (1, 2, 1)
        );
    }

    #[test]
    fn gender_ratio_should_include_unknown_gender() {
        let founders = [
            FounderSample { gender: Some(Gender::Female), age: Some(30) },
            FounderSample { gender: Some(Gender::Female), age: None },
            FounderSample { gender: Some(Gender::Male), age: Some(41) },
            FounderSample { gender: None, age: None },
        ];

        let ratio = gender_ratio(&founders);

        assert_eq!(ratio.len(), 3);
        let female = ratio
            .iter()
            .find(|g| g.gender == Some(Gender::Female))
            .expect("female bucket");
        assert_eq!(female.count, 2);
        assert_eq!(female.percentage, 50.0);
        assert!(ratio.iter().any(|g| g.gender.is_none() && g.count == 1));
    }

    #[test]
    fn average_age_should_skip_unknown_ages() {
        let founders = [
            FounderSample { gender: None, age: Some(30) },
            FounderSample { gender: None, age: Some(41) },
            FounderSample { gender: None, age: None },
        ];

        assert_eq!(average_age(&founders), Some(35.5));
        assert_eq!(average_age(&[]), None);
    }

    #[test]
    fn status_counts_should_group_by_status() {
        let counts = count_statuses(&[
            PitchStatus::Inbox,
            PitchStatus::Accepted,
            PitchStatus::Inbox,
        ]);

        assert_eq!(
            counts,
            vec![
                StatusCount { status: PitchStatus::Inbox, count: 2 },
                StatusCount { status: PitchStatus::Accepted, count: 1 },
            ]
        );
    }
}
