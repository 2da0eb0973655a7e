use std::cmp::Ordering;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

use interface::{CostSubmission, TargetMonth};
use tracing::debug;

/// (지점명, 대상 월) 별 최신 제출 기록 인덱스
#[derive(Debug, Clone, Default)]
pub struct BranchMonthIndex<'a> {
    entries: HashMap<(String, TargetMonth), &'a CostSubmission>,
}

impl<'a> BranchMonthIndex<'a> {
    pub fn get(&self, branch: &str, month: TargetMonth) -> Option<&'a CostSubmission> {
        self.entries.get(&(branch.to_string(), month)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, TargetMonth, &'a CostSubmission)> + '_ {
        self.entries
            .iter()
            .map(|((branch, month), submission)| (branch.as_str(), *month, *submission))
    }
}

/// `candidate`가 `current`를 대체하는지 판단
///
/// submittedAt이 큰 쪽이 이긴다 (없으면 0). 같으면 문서 ID가 큰 쪽이 이겨서
/// 조회 순서와 무관하게 결과가 정해진다.
pub fn supersedes(candidate: &CostSubmission, current: &CostSubmission) -> bool {
    match candidate
        .submitted_at_or_zero()
        .cmp(&current.submitted_at_or_zero())
    {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => candidate.id > current.id,
    }
}

/// 지점+월로 묶어서 각 그룹의 최신 제출 기록만 남긴다
///
/// 대상 월이 YYYY-MM 형식이 아니거나 지점명이 빈 기록은 조용히 제외된다.
pub fn build_branch_month_index<'a, I>(submissions: I) -> BranchMonthIndex<'a>
where
    I: IntoIterator<Item = &'a CostSubmission>,
{
    let mut entries: HashMap<(String, TargetMonth), &'a CostSubmission> = HashMap::new();

    for submission in submissions {
        let Some(month) = submission.parsed_month() else {
            debug!(
                "Skipping submission {} with malformed target month {:?}",
                submission.id, submission.target_month
            );
            continue;
        };
        if submission.branch_name.is_empty() {
            debug!("Skipping submission {} without branch name", submission.id);
            continue;
        }

        match entries.entry((submission.branch_name.clone(), month)) {
            Entry::Occupied(mut slot) => {
                if supersedes(submission, slot.get()) {
                    slot.insert(submission);
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(submission);
            }
        }
    }

    BranchMonthIndex { entries }
}
