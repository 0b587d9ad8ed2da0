use crate::models::pick::Pick;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Reward policy for one reconciliation run. The numbers moved around a lot
/// while the rules were being tuned, so nothing here is hard-coded at the
/// call sites; `Config` feeds overrides in from the environment.
#[derive(Debug, Clone)]
pub struct ScoringRules {
    pub reward_safe: i32,
    pub reward_voted_out: i32,
    pub reward_immunity: i32,
    /// A winning voted-out wager pays this multiple of the stake.
    pub wager_voted_out_multiplier: i32,
    pub parlay_bonus: i32,
}

impl Default for ScoringRules {
    fn default() -> Self {
        ScoringRules {
            reward_safe: 1,
            reward_voted_out: 3,
            reward_immunity: 2,
            wager_voted_out_multiplier: 2,
            parlay_bonus: 20,
        }
    }
}

impl ScoringRules {
    /// A winning immunity wager pays 1.5x the stake, truncated.
    fn immunity_wager_payout(&self, stake: i32) -> i32 {
        stake * 3 / 2
    }
}

/// How the immunity guess is judged this week. Pre-merge the challenge is won
/// by a whole tribe, so any guess from the winning tribe counts; post-merge
/// only the exact contestant does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImmunityMode {
    TribeMatch(String),
    ExactContestant(Option<i32>),
}

/// Pick the evaluation mode from the distinct tribe count of the season.
/// `winner_tribe` is the resolved winner's tribe, or the raw command argument
/// when the name did not match any contestant.
pub fn immunity_mode(
    distinct_tribes: i64,
    winner_contestant_id: Option<i32>,
    winner_tribe: Option<String>,
) -> ImmunityMode {
    if distinct_tribes > 1 {
        if let Some(tribe) = winner_tribe {
            return ImmunityMode::TribeMatch(tribe);
        }
    }
    ImmunityMode::ExactContestant(winner_contestant_id)
}

/// The prediction side of a pick, stripped of storage concerns.
#[derive(Debug, Clone, Default)]
pub struct PickFacts {
    pub safe_pick_id: Option<i32>,
    pub voted_out_pick_id: Option<i32>,
    pub immunity_pick_id: Option<i32>,
    /// Tribe of the guessed immunity contestant, for tribe-match weeks.
    pub immunity_pick_tribe: Option<String>,
    pub used_immunity_idol: bool,
    pub wager_voted_out: i32,
    pub wager_immunity: i32,
    pub parlay: bool,
}

impl PickFacts {
    pub fn from_pick(pick: &Pick, immunity_pick_tribe: Option<String>) -> PickFacts {
        PickFacts {
            safe_pick_id: pick.safe_pick_id,
            voted_out_pick_id: pick.voted_out_pick_id,
            immunity_pick_id: pick.immunity_pick_id,
            immunity_pick_tribe,
            used_immunity_idol: pick.used_immunity_idol,
            wager_voted_out: pick.wager_voted_out,
            wager_immunity: pick.wager_immunity,
            parlay: pick.parlay,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickScore {
    pub safe_correct: bool,
    pub voted_out_correct: bool,
    pub immunity_correct: bool,
    pub points_safe: i32,
    pub points_vo: i32,
    pub points_immunity: i32,
    pub points_wagers: i32,
    pub points_parlay: i32,
    pub points_week_total: i32,
}

/// Evaluate one pick against the real outcome. Recomputed from scratch every
/// run; nothing in here accumulates.
///
/// A losing parlay zeroes the voted-out and immunity base points and forfeits
/// both wager stakes, but the correctness flags are left intact since the
/// idol inventory is derived from them.
pub fn score_pick(
    facts: &PickFacts,
    voted_out_id: i32,
    mode: &ImmunityMode,
    rules: &ScoringRules,
) -> PickScore {
    let safe_correct =
        facts.safe_pick_id.is_some() && facts.safe_pick_id != Some(voted_out_id);
    let voted_out_correct = facts.voted_out_pick_id == Some(voted_out_id);
    let immunity_correct = match (facts.immunity_pick_id, mode) {
        (None, _) => false,
        (Some(_), ImmunityMode::TribeMatch(winning_tribe)) => {
            facts.immunity_pick_tribe.as_deref() == Some(winning_tribe.as_str())
        }
        (Some(guess_id), ImmunityMode::ExactContestant(winner_id)) => {
            Some(guess_id) == *winner_id
        }
    };

    let mut points_vo = if voted_out_correct {
        rules.reward_voted_out
    } else {
        0
    };
    let mut points_immunity = if immunity_correct {
        rules.reward_immunity
    } else {
        0
    };
    let points_safe = if safe_correct { rules.reward_safe } else { 0 };

    let parlay_lost = facts.parlay && !(voted_out_correct && immunity_correct);
    let (points_wagers, points_parlay) = if parlay_lost {
        points_vo = 0;
        points_immunity = 0;
        (-facts.wager_voted_out - facts.wager_immunity, 0)
    } else {
        let gain_vo = if voted_out_correct {
            rules.wager_voted_out_multiplier * facts.wager_voted_out
        } else {
            -facts.wager_voted_out
        };
        let gain_im = if immunity_correct {
            rules.immunity_wager_payout(facts.wager_immunity)
        } else {
            -facts.wager_immunity
        };
        let bonus = if facts.parlay && voted_out_correct && immunity_correct {
            rules.parlay_bonus
        } else {
            0
        };
        (gain_vo + gain_im, bonus)
    };

    PickScore {
        safe_correct,
        voted_out_correct,
        immunity_correct,
        points_safe,
        points_vo,
        points_immunity,
        points_wagers,
        points_parlay,
        points_week_total: points_safe + points_vo + points_immunity + points_wagers + points_parlay,
    }
}

/// Exile/elimination standing of a profile, captured before a pick is scored
/// so one pick can never trigger two transitions in the same pass.
/// `exiled_week_id` records the week whose pick caused the exile: when the
/// same week is reconciled again, the stored exile is recognized as this
/// pick's own doing and the second strike stays cold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Standing {
    pub exiled: bool,
    pub eliminated: bool,
    pub exiled_week_id: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandingChange {
    None,
    Exiled,
    Eliminated,
}

/// The two-strike state machine: an unprotected safe pick that goes home
/// exiles the profile; a second one, in a later week, while exiled
/// eliminates it for good. Week 1 never triggers, an idol always protects,
/// and elimination is terminal. Re-applying the week that caused an exile
/// is a no-op, so reconciliation stays idempotent.
pub fn standing_transition(
    before: Standing,
    safe_pick_id: Option<i32>,
    used_immunity_idol: bool,
    voted_out_id: i32,
    week_number: i32,
    week_id: i32,
) -> StandingChange {
    let safe_went_home = safe_pick_id == Some(voted_out_id);
    if !safe_went_home || used_immunity_idol || week_number <= 1 || before.eliminated {
        return StandingChange::None;
    }
    if before.exiled {
        if before.exiled_week_id == Some(week_id) {
            StandingChange::None
        } else {
            StandingChange::Eliminated
        }
    } else {
        StandingChange::Exiled
    }
}

impl Standing {
    pub fn apply(self, change: StandingChange, week_id: i32) -> Standing {
        match change {
            StandingChange::None => self,
            StandingChange::Exiled => Standing {
                exiled: true,
                eliminated: false,
                exiled_week_id: Some(week_id),
            },
            StandingChange::Eliminated => Standing {
                exiled: false,
                eliminated: true,
                exiled_week_id: None,
            },
        }
    }
}

/// Idols banked before this week, derived from prior-week picks only. The
/// stored profile counter is never consulted, so reprocessing a week cannot
/// drift the inventory.
pub fn prior_idols_available(prior_picks: &[Pick]) -> i32 {
    let earned = prior_picks
        .iter()
        .filter(|p| p.voted_out_correct == Some(true))
        .count() as i32;
    let used = prior_picks.iter().filter(|p| p.used_immunity_idol).count() as i32;
    (earned - used).max(0)
}

/// Deterministic auto-assign choice: candidates sorted by (id, name), then a
/// seeded draw keyed on (profile id, week id). Re-running the reconciler for
/// the same pair always lands on the same contestant.
pub fn stable_safe_choice(candidates: &[(i32, String)], profile_id: i32, week_id: i32) -> Option<i32> {
    if candidates.is_empty() {
        return None;
    }
    let mut sorted = candidates.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    let seed = ((profile_id as u32 as u64) << 32) | (week_id as u32 as u64);
    let mut rng = StdRng::seed_from_u64(seed);
    let index = rng.gen_range(0..sorted.len());
    Some(sorted[index].0)
}

/// Season-wide aggregates for one profile, fully recomputed from its picks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileAggregates {
    pub correct_safe_guesses: i32,
    pub correct_voted_out_guesses: i32,
    pub correct_immunity_guesses: i32,
    pub immunity_idols_played: i32,
    pub immunity_idols: i32,
    pub total_score: i32,
}

pub fn recompute_aggregates(season_picks: &[Pick], exile_return_cost: i32) -> ProfileAggregates {
    let correct_safe_guesses = season_picks
        .iter()
        .filter(|p| p.safe_correct == Some(true))
        .count() as i32;
    let correct_voted_out_guesses = season_picks
        .iter()
        .filter(|p| p.voted_out_correct == Some(true))
        .count() as i32;
    let correct_immunity_guesses = season_picks
        .iter()
        .filter(|p| p.immunity_correct == Some(true))
        .count() as i32;
    let immunity_idols_played = season_picks
        .iter()
        .filter(|p| p.used_immunity_idol)
        .count() as i32;
    let points: i32 = season_picks.iter().map(|p| p.points_week_total).sum();

    ProfileAggregates {
        correct_safe_guesses,
        correct_voted_out_guesses,
        correct_immunity_guesses,
        immunity_idols_played,
        immunity_idols: (correct_voted_out_guesses - immunity_idols_played).max(0),
        total_score: points - exile_return_cost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALEX: i32 = 1;
    const SAM: i32 = 2;
    const JO: i32 = 3;

    fn rules() -> ScoringRules {
        ScoringRules::default()
    }

    fn merged_mode(winner_id: i32) -> ImmunityMode {
        ImmunityMode::ExactContestant(Some(winner_id))
    }

    fn fresh_standing() -> Standing {
        Standing {
            exiled: false,
            eliminated: false,
            exiled_week_id: None,
        }
    }

    fn pick_row(facts: &PickFacts, score: Option<&PickScore>) -> Pick {
        Pick {
            id: 0,
            uuid: String::new(),
            profile_id: 1,
            week_id: 1,
            safe_pick_id: facts.safe_pick_id,
            voted_out_pick_id: facts.voted_out_pick_id,
            immunity_pick_id: facts.immunity_pick_id,
            used_immunity_idol: facts.used_immunity_idol,
            wager_voted_out: facts.wager_voted_out,
            wager_immunity: facts.wager_immunity,
            parlay: facts.parlay,
            auto_assigned: false,
            safe_correct: score.map(|s| s.safe_correct),
            voted_out_correct: score.map(|s| s.voted_out_correct),
            immunity_correct: score.map(|s| s.immunity_correct),
            points_safe: score.map(|s| s.points_safe).unwrap_or(0),
            points_vo: score.map(|s| s.points_vo).unwrap_or(0),
            points_immunity: score.map(|s| s.points_immunity).unwrap_or(0),
            points_wagers: score.map(|s| s.points_wagers).unwrap_or(0),
            points_parlay: score.map(|s| s.points_parlay).unwrap_or(0),
            points_week_total: score.map(|s| s.points_week_total).unwrap_or(0),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn week3_all_three_guesses_correct_post_merge() {
        // Week 3, Alex goes home, one tribe left. Safe=Sam survives,
        // voted-out=Alex hits, immunity=Jo hits.
        let facts = PickFacts {
            safe_pick_id: Some(SAM),
            voted_out_pick_id: Some(ALEX),
            immunity_pick_id: Some(JO),
            ..PickFacts::default()
        };
        let score = score_pick(&facts, ALEX, &merged_mode(JO), &rules());
        assert!(score.safe_correct && score.voted_out_correct && score.immunity_correct);
        assert_eq!(score.points_safe, 1);
        assert_eq!(score.points_vo, 3);
        assert_eq!(score.points_immunity, 2);
        assert_eq!(score.points_wagers, 0);
        assert_eq!(score.points_week_total, 6);
    }

    #[test]
    fn safe_pick_going_home_scores_zero_and_exiles() {
        let facts = PickFacts {
            safe_pick_id: Some(ALEX),
            ..PickFacts::default()
        };
        let score = score_pick(&facts, ALEX, &merged_mode(JO), &rules());
        assert!(!score.safe_correct);
        assert_eq!(score.points_safe, 0);

        let before = fresh_standing();
        let change = standing_transition(before, Some(ALEX), false, ALEX, 2, 20);
        assert_eq!(change, StandingChange::Exiled);
        assert!(before.apply(change, 20).exiled);
    }

    #[test]
    fn exiled_profile_is_eliminated_on_second_strike() {
        let before = fresh_standing();
        let after_week_n =
            before.apply(standing_transition(before, Some(ALEX), false, ALEX, 4, 40), 40);
        assert!(after_week_n.exiled);

        let change = standing_transition(after_week_n, Some(SAM), false, SAM, 5, 50);
        assert_eq!(change, StandingChange::Eliminated);
        let after_week_n1 = after_week_n.apply(change, 50);
        assert!(after_week_n1.eliminated);
        assert!(!after_week_n1.exiled);
    }

    #[test]
    fn rerunning_the_exiling_week_does_not_escalate_to_elimination() {
        // First application exiles and the standing is persisted. Applying
        // the same week's outcome again must leave it exactly as it was,
        // not treat the stored exile as a second strike.
        let first_run =
            fresh_standing().apply(
                standing_transition(fresh_standing(), Some(ALEX), false, ALEX, 4, 40),
                40,
            );
        assert!(first_run.exiled && !first_run.eliminated);

        let rerun_change = standing_transition(first_run, Some(ALEX), false, ALEX, 4, 40);
        assert_eq!(rerun_change, StandingChange::None);
        assert_eq!(first_run.apply(rerun_change, 40), first_run);
    }

    #[test]
    fn second_application_of_a_week_changes_nothing() {
        // Full derived state for one profile and one week: score, standing,
        // aggregates. Run the same outcome through twice, persisting in
        // between; the second pass must reproduce the first exactly.
        let facts = PickFacts {
            safe_pick_id: Some(ALEX),
            voted_out_pick_id: Some(SAM),
            immunity_pick_id: Some(JO),
            wager_voted_out: 3,
            ..PickFacts::default()
        };

        let score1 = score_pick(&facts, ALEX, &merged_mode(JO), &rules());
        let row1 = pick_row(&facts, Some(&score1));
        let standing1 = fresh_standing().apply(
            standing_transition(fresh_standing(), facts.safe_pick_id, false, ALEX, 4, 40),
            40,
        );
        let aggregates1 = recompute_aggregates(&[row1.clone()], 0);
        assert!(standing1.exiled);

        let score2 = score_pick(&facts, ALEX, &merged_mode(JO), &rules());
        let row2 = pick_row(&facts, Some(&score2));
        let standing2 = standing1.apply(
            standing_transition(standing1, facts.safe_pick_id, false, ALEX, 4, 40),
            40,
        );
        let aggregates2 = recompute_aggregates(&[row2], 0);

        assert_eq!(score1, score2);
        assert_eq!(standing1, standing2);
        assert_eq!(aggregates1, aggregates2);
    }

    #[test]
    fn strike_after_returning_from_exile_exiles_again() {
        // The buy-back flow clears the exile but may leave the old week
        // recorded; a fresh strike in a later week starts a new exile
        // rather than eliminating.
        let returned = Standing {
            exiled: false,
            eliminated: false,
            exiled_week_id: Some(40),
        };
        let change = standing_transition(returned, Some(ALEX), false, ALEX, 6, 60);
        assert_eq!(change, StandingChange::Exiled);
        assert_eq!(returned.apply(change, 60).exiled_week_id, Some(60));
    }

    #[test]
    fn idol_protects_against_exile() {
        let change = standing_transition(fresh_standing(), Some(ALEX), true, ALEX, 3, 30);
        assert_eq!(change, StandingChange::None);
    }

    #[test]
    fn week_one_never_exiles() {
        assert_eq!(
            standing_transition(fresh_standing(), Some(ALEX), false, ALEX, 1, 10),
            StandingChange::None
        );
    }

    #[test]
    fn elimination_is_terminal() {
        let before = Standing {
            exiled: false,
            eliminated: true,
            exiled_week_id: None,
        };
        assert_eq!(
            standing_transition(before, Some(ALEX), false, ALEX, 6, 60),
            StandingChange::None
        );
    }

    #[test]
    fn losing_parlay_forfeits_wagers_but_keeps_correctness() {
        // Voted-out hits, immunity misses: all-or-nothing loss.
        let facts = PickFacts {
            safe_pick_id: Some(SAM),
            voted_out_pick_id: Some(ALEX),
            immunity_pick_id: Some(SAM),
            wager_voted_out: 5,
            wager_immunity: 4,
            parlay: true,
            ..PickFacts::default()
        };
        let score = score_pick(&facts, ALEX, &merged_mode(JO), &rules());
        assert!(score.voted_out_correct);
        assert!(!score.immunity_correct);
        assert_eq!(score.points_vo, 0);
        assert_eq!(score.points_immunity, 0);
        assert_eq!(score.points_wagers, -9);
        assert_eq!(score.points_parlay, 0);
        assert_eq!(score.points_week_total, 1 - 9);
    }

    #[test]
    fn winning_parlay_pays_bonus_on_top_of_wagers() {
        let facts = PickFacts {
            safe_pick_id: Some(SAM),
            voted_out_pick_id: Some(ALEX),
            immunity_pick_id: Some(JO),
            wager_voted_out: 5,
            wager_immunity: 4,
            parlay: true,
            ..PickFacts::default()
        };
        let score = score_pick(&facts, ALEX, &merged_mode(JO), &rules());
        // 2x on the voted-out stake, 1.5x truncated on the immunity stake.
        assert_eq!(score.points_wagers, 10 + 6);
        assert_eq!(score.points_parlay, 20);
        assert_eq!(score.points_week_total, 1 + 3 + 2 + 16 + 20);
    }

    #[test]
    fn independent_wagers_settle_separately_without_parlay() {
        let facts = PickFacts {
            safe_pick_id: Some(SAM),
            voted_out_pick_id: Some(ALEX),
            immunity_pick_id: Some(SAM),
            wager_voted_out: 4,
            wager_immunity: 3,
            ..PickFacts::default()
        };
        let score = score_pick(&facts, ALEX, &merged_mode(JO), &rules());
        assert_eq!(score.points_wagers, 8 - 3);
    }

    #[test]
    fn tribe_match_mode_accepts_any_winning_tribe_member() {
        let mode = immunity_mode(2, None, Some("Luzon".to_string()));
        assert_eq!(mode, ImmunityMode::TribeMatch("Luzon".to_string()));

        let on_tribe = PickFacts {
            immunity_pick_id: Some(SAM),
            immunity_pick_tribe: Some("Luzon".to_string()),
            ..PickFacts::default()
        };
        let off_tribe = PickFacts {
            immunity_pick_id: Some(JO),
            immunity_pick_tribe: Some("Solana".to_string()),
            ..PickFacts::default()
        };
        assert!(score_pick(&on_tribe, ALEX, &mode, &rules()).immunity_correct);
        assert!(!score_pick(&off_tribe, ALEX, &mode, &rules()).immunity_correct);
    }

    #[test]
    fn merged_mode_requires_exact_contestant() {
        let mode = immunity_mode(1, Some(JO), None);
        assert_eq!(mode, ImmunityMode::ExactContestant(Some(JO)));

        let same_tribe_wrong_person = PickFacts {
            immunity_pick_id: Some(SAM),
            immunity_pick_tribe: Some("Merged".to_string()),
            ..PickFacts::default()
        };
        assert!(!score_pick(&same_tribe_wrong_person, ALEX, &mode, &rules()).immunity_correct);
    }

    #[test]
    fn missing_immunity_guess_is_never_correct() {
        let facts = PickFacts::default();
        assert!(!score_pick(&facts, ALEX, &merged_mode(JO), &rules()).immunity_correct);
    }

    #[test]
    fn scoring_is_idempotent() {
        let facts = PickFacts {
            safe_pick_id: Some(SAM),
            voted_out_pick_id: Some(ALEX),
            immunity_pick_id: Some(JO),
            wager_voted_out: 5,
            wager_immunity: 2,
            parlay: true,
            ..PickFacts::default()
        };
        let first = score_pick(&facts, ALEX, &merged_mode(JO), &rules());
        let second = score_pick(&facts, ALEX, &merged_mode(JO), &rules());
        assert_eq!(first, second);
    }

    #[test]
    fn stable_safe_choice_is_deterministic_and_order_independent() {
        let candidates = vec![
            (5, "Parvati".to_string()),
            (2, "Rob".to_string()),
            (9, "Sandra".to_string()),
        ];
        let mut shuffled = candidates.clone();
        shuffled.reverse();

        let first = stable_safe_choice(&candidates, 11, 42);
        let second = stable_safe_choice(&shuffled, 11, 42);
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn stable_safe_choice_returns_none_without_candidates() {
        assert_eq!(stable_safe_choice(&[], 11, 42), None);
    }

    #[test]
    fn prior_idols_never_go_negative() {
        let earned = pick_row(
            &PickFacts::default(),
            Some(&PickScore {
                safe_correct: false,
                voted_out_correct: true,
                immunity_correct: false,
                points_safe: 0,
                points_vo: 3,
                points_immunity: 0,
                points_wagers: 0,
                points_parlay: 0,
                points_week_total: 3,
            }),
        );
        let burned = pick_row(
            &PickFacts {
                used_immunity_idol: true,
                ..PickFacts::default()
            },
            None,
        );
        assert_eq!(prior_idols_available(&[earned.clone()]), 1);
        assert_eq!(prior_idols_available(&[earned, burned.clone()]), 0);
        assert_eq!(prior_idols_available(&[burned]), 0);
    }

    #[test]
    fn aggregates_recompute_from_scratch() {
        let facts = PickFacts {
            safe_pick_id: Some(SAM),
            voted_out_pick_id: Some(ALEX),
            immunity_pick_id: Some(JO),
            ..PickFacts::default()
        };
        let score = score_pick(&facts, ALEX, &merged_mode(JO), &rules());
        let week1 = pick_row(&facts, Some(&score));
        let week2 = pick_row(
            &PickFacts {
                used_immunity_idol: true,
                ..PickFacts::default()
            },
            None,
        );

        let aggregates = recompute_aggregates(&[week1.clone(), week2.clone()], 2);
        assert_eq!(aggregates.correct_safe_guesses, 1);
        assert_eq!(aggregates.correct_voted_out_guesses, 1);
        assert_eq!(aggregates.correct_immunity_guesses, 1);
        assert_eq!(aggregates.immunity_idols_played, 1);
        assert_eq!(aggregates.immunity_idols, 0);
        assert_eq!(aggregates.total_score, 6 - 2);

        // Same inputs, same outputs, however many times we run it.
        assert_eq!(aggregates, recompute_aggregates(&[week1, week2], 2));
    }

    #[test]
    fn losing_parlay_still_feeds_idol_inventory() {
        let facts = PickFacts {
            voted_out_pick_id: Some(ALEX),
            immunity_pick_id: Some(SAM),
            wager_voted_out: 2,
            wager_immunity: 2,
            parlay: true,
            ..PickFacts::default()
        };
        let score = score_pick(&facts, ALEX, &merged_mode(JO), &rules());
        assert_eq!(score.points_vo, 0);
        let row = pick_row(&facts, Some(&score));
        assert_eq!(prior_idols_available(&[row]), 1);
    }
}
