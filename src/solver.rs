use crate::availability::build_participants;
use crate::data::{GroupingOutput, GroupingRequest, Participant, Slot};
use crate::error::ScheduleError;
use crate::input::{read_bells, read_roster, read_timetable};
use crate::time::format_slot;
use good_lp::variable;
use good_lp::{Expression, ProblemVariables, Solution, SolverModel, Variable, constraint, default_solver};
use itertools::Itertools;
use log::{debug, info};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Instant;

/// Wait cost marking a temporal conflict. Pairs at or above this never enter
/// the optimization model at all.
pub const INFEASIBLE_WAIT: u32 = 1_000_000;

/// Minutes a participant would idle between their fixed commitment and `slot`
/// on the slot's day.
///
/// Zero when there is no commitment that day; the gap to the commitment
/// boundary when the slot lies entirely before or after it; the infeasibility
/// sentinel when the two overlap.
pub fn wait_minutes(participant: &Participant, slot: &Slot) -> u32 {
    let Some(&(commitment_start, commitment_end)) = participant.commitments.get(&slot.day) else {
        return 0;
    };
    if slot.end <= commitment_start {
        return commitment_start - slot.end;
    }
    if slot.start >= commitment_end {
        return slot.start - commitment_end;
    }
    INFEASIBLE_WAIT
}

/// Inverts per-person candidate lists into slot -> eligible people and keeps
/// only slots that could reach `min_size`. A necessary filter, not a
/// sufficient one: the optimization below only ever shrinks membership.
pub fn build_candidate_pool(
    participants: &[Participant],
    min_size: usize,
) -> HashMap<Slot, HashSet<usize>> {
    participants
        .iter()
        .enumerate()
        .flat_map(|(index, participant)| {
            participant
                .candidate_slots
                .iter()
                .cloned()
                .map(move |slot| (slot, index))
        })
        .into_group_map()
        .into_iter()
        .map(|(slot, eligible)| (slot, eligible.into_iter().collect::<HashSet<usize>>()))
        .filter(|(_, eligible)| eligible.len() >= min_size)
        .collect()
}

/// One person->slot pairing the optimizer may pick, with its wait cost.
struct CandidateEdge {
    person: usize,
    slot: usize,
    wait: u32,
}

/// Collects the feasibility edges for the current pool: a person is connected
/// to a slot only when eligible for it and free of temporal conflict.
fn eligible_edges(
    participants: &[Participant],
    slots: &[Slot],
    pool: &HashMap<Slot, HashSet<usize>>,
) -> Vec<CandidateEdge> {
    let mut edges = Vec::new();
    for (slot_index, slot) in slots.iter().enumerate() {
        let mut eligible: Vec<usize> = pool[slot].iter().copied().collect();
        eligible.sort_unstable();
        for person in eligible {
            let wait = wait_minutes(&participants[person], slot);
            if wait >= INFEASIBLE_WAIT {
                continue;
            }
            edges.push(CandidateEdge {
                person,
                slot: slot_index,
                wait,
            });
        }
    }
    edges
}

/// Solves the bipartite assignment as a 0/1 integer program: one binary
/// variable per feasibility edge, at most one slot per person, at most
/// `max_size` people per slot.
///
/// With `target` unset the objective is maximum cardinality (the max-flow
/// value of the unit-capacity network); with `target` set the model instead
/// minimizes total wait cost among assignments of exactly that size.
fn solve_assignment(
    edges: &[CandidateEdge],
    n_people: usize,
    n_slots: usize,
    max_size: usize,
    target: Option<u32>,
) -> Result<Vec<(usize, usize)>, ScheduleError> {
    let mut problem = ProblemVariables::new();
    let vars = problem.add_vector(variable().binary(), edges.len());

    let total: Expression = vars.iter().map(|var| *var).sum();
    let mut model = match target {
        None => problem.maximise(total.clone()).using(default_solver),
        Some(_) => {
            let cost: Expression = edges
                .iter()
                .zip(&vars)
                .map(|(edge, var)| edge.wait as f64 * Expression::from(*var))
                .sum();
            problem.minimise(cost).using(default_solver)
        }
    }
    .set_option("threads", 1) // limit to 1 thread for reproducibility
    .set_option("random_seed", 1234) //set seed for reproducibility
    .set_option("log_to_console", "false");

    let mut per_person: Vec<Vec<Variable>> = vec![Vec::new(); n_people];
    let mut per_slot: Vec<Vec<Variable>> = vec![Vec::new(); n_slots];
    for (edge, var) in edges.iter().zip(&vars) {
        per_person[edge.person].push(*var);
        per_slot[edge.slot].push(*var);
    }

    // a person takes at most one slot
    for person_vars in &per_person {
        if person_vars.is_empty() {
            continue;
        }
        let taken: Expression = person_vars.iter().map(|var| *var).sum();
        model.add_constraint(constraint!(taken <= 1));
    }

    // a slot holds at most max_size people
    let capacity = max_size as f64;
    for slot_vars in &per_slot {
        if slot_vars.is_empty() {
            continue;
        }
        let filled: Expression = slot_vars.iter().map(|var| *var).sum();
        model.add_constraint(constraint!(filled <= capacity));
    }

    if let Some(target) = target {
        let quota = target as f64;
        model.add_constraint(constraint!(total == quota));
    }

    let solution = model
        .solve()
        .map_err(|e| ScheduleError::Solver(e.to_string()))?;

    let mut pairs = Vec::new();
    for (edge, var) in edges.iter().zip(&vars) {
        if solution.value(*var) > 0.9 {
            pairs.push((edge.person, edge.slot));
        }
    }
    Ok(pairs)
}

/// Phase 1 of the engine: the maximum number of person->slot pairings the
/// current pool admits.
fn max_assignable(
    edges: &[CandidateEdge],
    n_people: usize,
    n_slots: usize,
    max_size: usize,
) -> Result<u32, ScheduleError> {
    let pairs = solve_assignment(edges, n_people, n_slots, max_size, None)?;
    Ok(pairs.len() as u32)
}

/// Phase 2: among all assignments of exactly `target` pairings, the one with
/// minimum total wait.
fn cheapest_assignment_of_size(
    edges: &[CandidateEdge],
    n_people: usize,
    n_slots: usize,
    max_size: usize,
    target: u32,
) -> Result<Vec<(usize, usize)>, ScheduleError> {
    solve_assignment(edges, n_people, n_slots, max_size, Some(target))
}

/// Runs the assignment engine over an existing candidate pool, iteratively
/// dropping slots whose assigned count lands below `min_size` and re-solving,
/// until every retained slot is viable or the pool is exhausted.
///
/// The model is rebuilt from scratch on every repair iteration; the pool
/// strictly shrinks, so the loop terminates.
fn solve_pool(
    participants: &[Participant],
    mut pool: HashMap<Slot, HashSet<usize>>,
    min_size: usize,
    max_size: usize,
) -> Result<GroupingOutput, ScheduleError> {
    while !pool.is_empty() {
        let slots: Vec<Slot> = pool.keys().cloned().sorted().collect();
        let edges = eligible_edges(participants, &slots, &pool);
        if edges.is_empty() {
            return Ok(GroupingOutput::default());
        }

        let target = max_assignable(&edges, participants.len(), slots.len(), max_size)?;
        if target == 0 {
            return Ok(GroupingOutput::default());
        }
        debug!("{} slots in pool, maximum cardinality {}", slots.len(), target);

        let pairs =
            cheapest_assignment_of_size(&edges, participants.len(), slots.len(), max_size, target)?;

        let mut members: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for &(person, slot_index) in &pairs {
            members.entry(slot_index).or_default().push(person);
        }

        let underfilled: Vec<usize> = members
            .iter()
            .filter(|(_, assigned)| assigned.len() < min_size)
            .map(|(&slot_index, _)| slot_index)
            .collect();

        if underfilled.is_empty() {
            let mut groups = BTreeMap::new();
            let mut assigned_count = 0;
            let mut total_wait_minutes = 0u64;
            for (slot_index, mut assigned) in members {
                let slot = &slots[slot_index];
                assigned.sort_unstable(); // roster order
                assigned_count += assigned.len();
                total_wait_minutes += assigned
                    .iter()
                    .map(|&person| wait_minutes(&participants[person], slot) as u64)
                    .sum::<u64>();
                groups.insert(
                    format_slot(slot),
                    assigned
                        .iter()
                        .map(|&person| participants[person].id())
                        .collect(),
                );
            }
            return Ok(GroupingOutput {
                groups,
                assigned_count,
                total_wait_minutes,
            });
        }

        for slot_index in underfilled {
            debug!(
                "dropping {} ({} assigned, minimum {})",
                format_slot(&slots[slot_index]),
                members[&slot_index].len(),
                min_size
            );
            pool.remove(&slots[slot_index]);
        }
    }
    Ok(GroupingOutput::default())
}

/// Computes the globally optimal grouping for the given participants: a
/// maximum-cardinality assignment refined to minimum total wait, with
/// under-minimum slots repaired away.
pub fn assign_groups(
    participants: &[Participant],
    min_size: usize,
    max_size: usize,
) -> Result<GroupingOutput, ScheduleError> {
    let pool = build_candidate_pool(participants, min_size);
    info!(
        "candidate pool: {} slots over {} participants",
        pool.len(),
        participants.len()
    );
    solve_pool(participants, pool, min_size, max_size)
}

/// End-to-end run: parse the three CSV sources, resolve availability, solve.
pub fn plan_groups(request: &GroupingRequest) -> Result<GroupingOutput, ScheduleError> {
    let start_time = Instant::now();

    let bells = read_bells(&request.bells_csv)?;
    let timetable = read_timetable(&bells, &request.timetable_csv)?;
    let roster = read_roster(&request.roster_csv)?;
    let participants = build_participants(&timetable, &roster, &request.config)?;

    let output = assign_groups(&participants, request.config.min_size, request.config.max_size)?;
    info!(
        "grouped {} of {} participants into {} slots in {:.2?}",
        output.assigned_count,
        participants.len(),
        output.groups.len(),
        start_time.elapsed()
    );
    Ok(output)
}
