//! Cleaning crew optimizer
//!
//! Dispatches a cleaning crew over a fixed horizon in response to restroom
//! demand. Each step the optimizer
//!
//! 1. finishes travel legs, cleanings and restock trips that have ended
//! 2. accumulates passenger usage per restroom and opens usage-based tasks
//! 3. turns waiting-time spikes into call-ins and emergencies
//! 4. staffs urgent tasks immediately, preempting lower-priority work if needed
//! 5. batch-assigns every pending task that falls inside the lookahead window
//!
//! Indicator snapshots are taken hourly and once more at the horizon end.

use super::inputs::{CleaningRequirement, DemandSnapshot, RestroomCapacity, TravelTimeMatrix};
use super::kpi::{KpiInputs, KpiSnapshot};
use super::results::{AssignmentRecord, OptimizationResults, ScheduleEvent, TaskCompletion, TaskRecord};
use super::scoring::{best_team, individual_score, max_cleaners, target_team_size, Candidate};
use super::task::passenger_impact;
use super::{CleaningTask, CrewMember, FULL_SUPPLIES};
use crate::simulation::{SimulationError, SimulationResult, TimeManager};
use crate::types::{
    CleaningType, ConfigValidationError, CrewConfig, CrewId, CrewStatus, LocationId, RestroomId, RunId, TaskId,
};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

/// Schedules a cleaning crew against restroom demand
#[derive(Debug, Clone)]
pub struct CleaningCrewOptimizer {
    restrooms: BTreeMap<RestroomId, RestroomCapacity>,
    travel: TravelTimeMatrix,
    duration: f64,
    dt: f64,
    config: CrewConfig,
}

impl CleaningCrewOptimizer {
    /// Create an optimizer over `duration` seconds in steps of `dt`
    pub fn new(
        restrooms: BTreeMap<RestroomId, RestroomCapacity>,
        travel: TravelTimeMatrix,
        duration: f64,
        dt: f64,
        config: CrewConfig,
    ) -> SimulationResult<Self> {
        config.validate()?;
        if !(dt > 0.0) {
            return Err(ConfigValidationError::InvalidTimeStep(dt).into());
        }
        if !(duration >= dt) {
            return Err(ConfigValidationError::InvalidDuration { duration, time_step: dt }.into());
        }
        if restrooms.is_empty() {
            return Err(ConfigValidationError::Empty("restroom").into());
        }

        info!(
            restrooms = restrooms.len(),
            crew = config.crew_members.len(),
            duration,
            dt,
            "Cleaning crew optimizer initialized"
        );
        Ok(Self { restrooms, travel, duration, dt, config })
    }

    /// Crew configuration
    pub fn config(&self) -> &CrewConfig {
        &self.config
    }

    /// Restrooms the crew serves
    pub fn restrooms(&self) -> &BTreeMap<RestroomId, RestroomCapacity> {
        &self.restrooms
    }

    /// Steps in the horizon, a partial last step counts
    pub fn n_steps(&self) -> usize {
        (self.duration / self.dt).ceil() as usize
    }

    /// Time manager anchored at the configured base epoch
    pub fn time_manager(&self) -> SimulationResult<TimeManager> {
        TimeManager::new(self.config.base_epoch)
    }

    /// Run the crew over the horizon
    ///
    /// Every call starts from a fresh crew at their bases. Routine tasks are
    /// spread evenly over the horizon from `requirements`; requirements for
    /// restrooms the optimizer does not know are skipped.
    #[instrument(skip_all, fields(duration = self.duration, dt = self.dt))]
    pub fn run_optimization(
        &self,
        demand: &DemandSnapshot,
        requirements: &[CleaningRequirement],
    ) -> SimulationResult<OptimizationResults> {
        let mut run = OptimizationRun::new(self, demand);
        run.schedule_routine_tasks(requirements);
        info!(routine_tasks = run.tasks.len(), "Starting crew optimization");

        let n_steps = self.n_steps();
        let kpi_interval = ((3600.0 / self.dt).floor() as usize).max(1);

        for t_idx in 0..n_steps {
            let now = t_idx as f64 * self.dt;
            run.step(t_idx, now)?;

            if t_idx % kpi_interval == 0 {
                let snapshot = run.kpi_inputs().snapshot(now);
                debug!(time = now, cost = snapshot.total_cost, "KPI snapshot");
                run.kpi_timeline.push(snapshot);
            }
        }

        let final_kpis = run.kpi_inputs().snapshot(self.duration);
        if run.kpi_timeline.last().map_or(true, |k| k.time < self.duration) {
            run.kpi_timeline.push(final_kpis.clone());
        }

        let results = run.into_results(final_kpis, n_steps);
        info!(
            tasks = results.task_summary.total_tasks,
            completed = results.task_summary.completed_tasks,
            total_cost = results.final_kpis.total_cost,
            "Crew optimization completed"
        );
        Ok(results)
    }
}

/// Mutable state of one optimization run
struct OptimizationRun<'a> {
    optimizer: &'a CleaningCrewOptimizer,
    demand: &'a DemandSnapshot,
    crew: Vec<CrewMember>,
    tasks: Vec<CleaningTask>,
    last_task_id: u64,
    usage: BTreeMap<RestroomId, f64>,
    schedules: BTreeMap<CrewId, Vec<ScheduleEvent>>,
    restock_cost: f64,
    kpi_timeline: Vec<KpiSnapshot>,
    assignments: Vec<AssignmentRecord>,
    completions: Vec<TaskCompletion>,
}

impl<'a> OptimizationRun<'a> {
    fn new(optimizer: &'a CleaningCrewOptimizer, demand: &'a DemandSnapshot) -> Self {
        let crew: Vec<CrewMember> = optimizer
            .config
            .crew_members
            .iter()
            .enumerate()
            .map(|(i, spec)| CrewMember::from_spec(CrewId(i as u32 + 1), spec))
            .collect();
        let schedules = crew.iter().map(|c| (c.id, Vec::new())).collect();

        Self {
            optimizer,
            demand,
            crew,
            tasks: Vec::new(),
            last_task_id: 0,
            usage: optimizer.restrooms.keys().map(|r| (r.clone(), 0.0)).collect(),
            schedules,
            restock_cost: 0.0,
            kpi_timeline: Vec::new(),
            assignments: Vec::new(),
            completions: Vec::new(),
        }
    }

    fn config(&self) -> &'a CrewConfig {
        &self.optimizer.config
    }

    fn next_task_id(&mut self) -> TaskId {
        self.last_task_id += 1;
        TaskId(self.last_task_id)
    }

    fn task_index(&self, id: TaskId) -> SimulationResult<usize> {
        self.tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| SimulationError::scheduling_error(format!("unknown task {}", id)))
    }

    fn crew_index(&self, id: CrewId) -> SimulationResult<usize> {
        self.crew
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| SimulationError::scheduling_error(format!("unknown crew member {}", id)))
    }

    fn travel(&self, from: &LocationId, to: &LocationId) -> SimulationResult<f64> {
        self.optimizer.travel.travel_time(from, to)
    }

    fn impact_at(&self, restroom: &RestroomId, t_idx: usize) -> f64 {
        passenger_impact(
            self.demand.arrival_rate(restroom, t_idx),
            self.demand.max_queue_length(restroom, t_idx),
            self.demand.max_waiting_time(restroom, t_idx),
        )
    }

    fn kpi_inputs(&self) -> KpiInputs<'_> {
        KpiInputs {
            crew: &self.crew,
            tasks: &self.tasks,
            config: self.config(),
            duration: self.optimizer.duration,
            restock_cost: self.restock_cost,
            usage: &self.usage,
        }
    }

    fn schedule_routine_tasks(&mut self, requirements: &[CleaningRequirement]) {
        let config = self.config();
        let minutes = config.cleaning_durations.routine;
        for requirement in requirements {
            if requirement.count == 0 {
                continue;
            }
            if !self.optimizer.restrooms.contains_key(&requirement.restroom_id) {
                warn!(restroom = %requirement.restroom_id, "Skipping cleaning requirement for unknown restroom");
                continue;
            }
            let interval = self.optimizer.duration / (requirement.count as f64 + 1.0);
            for k in 1..=requirement.count {
                let required_time = k as f64 * interval;
                let id = self.next_task_id();
                let task = CleaningTask::new(
                    id,
                    requirement.restroom_id.clone(),
                    CleaningType::Routine,
                    2,
                    minutes,
                    required_time,
                )
                .with_deadline(required_time + config.scheduling.routine_deadline);
                self.tasks.push(task);
            }
        }
    }

    fn step(&mut self, t_idx: usize, now: f64) -> SimulationResult<()> {
        self.update_crew_status(now)?;
        if self.demand.has_arrival_data() {
            self.track_usage(t_idx, now);
        }

        let mut dispatched = BTreeMap::new();
        for task_idx in self.detect_urgent_tasks(t_idx, now) {
            if let Some(crew_id) = self.handle_urgent_task(task_idx, t_idx, now)? {
                dispatched.insert(self.tasks[task_idx].id, vec![crew_id]);
            }
        }

        for (task_idx, team) in self.batch_assign(now)? {
            self.execute(task_idx, &team, t_idx, now)?;
            dispatched.insert(self.tasks[task_idx].id, team);
        }

        if !dispatched.is_empty() {
            self.assignments.push(AssignmentRecord { time: now, assignments: dispatched });
        }
        Ok(())
    }

    fn update_crew_status(&mut self, now: f64) -> SimulationResult<()> {
        let per_cleaning = self.config().supply_management.supplies_per_cleaning;
        for i in 0..self.crew.len() {
            let member = &mut self.crew[i];
            if member.status == CrewStatus::Traveling
                && member.current_task.is_some()
                && now >= member.travel_end_time
                && now < member.current_task_end_time
            {
                member.status = CrewStatus::Cleaning;
            }

            if member.current_task_end_time > 0.0 && now >= member.current_task_end_time {
                member.status = CrewStatus::Idle;
                member.current_task_end_time = 0.0;
                if let Some(task_id) = member.current_task.take() {
                    self.finish_work(i, task_id, now)?;
                }
                if self.crew[i].supplies_remaining < per_cleaning {
                    self.restock(i, now)?;
                }
            }
        }
        Ok(())
    }

    fn finish_work(&mut self, crew_idx: usize, task_id: TaskId, now: f64) -> SimulationResult<()> {
        let task_idx = self.task_index(task_id)?;
        let task = &self.tasks[task_idx];
        let team_size = task.assigned_crew.len().max(1) as f64;
        let work_minutes = task.estimated_duration / team_size;
        let supplies =
            self.config().supply_management.supplies_per_cleaning * task.cleaning_type.supply_factor();
        let still_working = task
            .assigned_crew
            .iter()
            .any(|&id| self.crew.iter().any(|c| c.id == id && c.current_task == Some(task_id)));

        let member = &mut self.crew[crew_idx];
        member.total_work_time += work_minutes;
        member.supplies_remaining = (member.supplies_remaining - supplies).max(0.0);

        let task = &mut self.tasks[task_idx];
        if !still_working && task.is_open() {
            task.completion_time = Some(now);
            self.usage.insert(task.restroom_id.clone(), 0.0);
            self.completions.push(TaskCompletion {
                time: now,
                task_id,
                restroom_id: task.restroom_id.clone(),
                cleaning_type: task.cleaning_type,
                crew: task.assigned_crew.clone(),
            });
            debug!(task = %task_id, restroom = %task.restroom_id, time = now, "Task completed");
        }
        Ok(())
    }

    fn restock(&mut self, crew_idx: usize, now: f64) -> SimulationResult<()> {
        let supply = &self.config().supply_management;
        let location = self.crew[crew_idx].current_location.clone();
        let trip = self.travel(&location, &supply.depot_location)?
            + supply.restock_time_minutes * 60.0
            + self.travel(&supply.depot_location, &location)?;

        let member = &mut self.crew[crew_idx];
        member.status = CrewStatus::Traveling;
        member.travel_end_time = now + trip;
        member.current_task_end_time = now + trip;
        member.supplies_remaining = FULL_SUPPLIES;
        member.last_restock_time = now;
        self.restock_cost += supply.restock_cost;

        self.schedules.entry(member.id).or_default().push(ScheduleEvent {
            start: now,
            end: now + trip,
            task_id: None,
            restroom_id: None,
            status: CrewStatus::Traveling,
        });
        debug!(crew = %member.id, until = now + trip, "Crew member restocking");
        Ok(())
    }

    fn track_usage(&mut self, t_idx: usize, now: f64) {
        let optimizer = self.optimizer;
        let config = self.config();
        for restroom in optimizer.restrooms.keys() {
            let usage = self.usage.entry(restroom.clone()).or_insert(0.0);
            *usage += self.demand.arrival_rate(restroom, t_idx) * optimizer.dt;
            let usage = *usage;
            if usage < config.usage_threshold {
                continue;
            }

            let open = self
                .tasks
                .iter()
                .any(|t| t.restroom_id == *restroom && t.cleaning_type == CleaningType::UsageBased && t.is_open());
            if open {
                continue;
            }

            let id = self.next_task_id();
            let task = CleaningTask::new(
                id,
                restroom.clone(),
                CleaningType::UsageBased,
                2,
                config.cleaning_durations.usage_based,
                now,
            )
            .with_deadline(now + config.scheduling.usage_deadline)
            .created_at(now)
            .with_impact(self.impact_at(restroom, t_idx));
            info!(task = %id, restroom = %restroom, usage, "Usage-based cleaning requested");
            self.tasks.push(task);
        }
    }

    fn has_recent_urgent_task(&self, restroom: &RestroomId, now: f64) -> bool {
        let window = self.config().scheduling.duplicate_suppression;
        self.tasks.iter().any(|t| {
            t.restroom_id == *restroom && t.priority >= 3 && t.is_open() && (t.created_time - now).abs() < window
        })
    }

    fn detect_urgent_tasks(&mut self, t_idx: usize, now: f64) -> Vec<usize> {
        let optimizer = self.optimizer;
        let config = self.config();
        let mut created = Vec::new();

        for restroom in optimizer.restrooms.keys() {
            let waiting_time = self.demand.max_waiting_time(restroom, t_idx);
            if waiting_time <= 0.0 {
                continue;
            }
            let (cleaning_type, priority) = match config.urgency.classify(waiting_time) {
                Some(classified) => classified,
                None => continue,
            };
            if self.has_recent_urgent_task(restroom, now) {
                debug!(restroom = %restroom, waiting_time, "Urgent task already open");
                continue;
            }

            let deadline = now
                + if cleaning_type == CleaningType::Emergency {
                    config.scheduling.emergency_deadline
                } else {
                    config.scheduling.call_in_deadline
                };
            let id = self.next_task_id();
            let task = CleaningTask::new(
                id,
                restroom.clone(),
                cleaning_type,
                priority,
                config.cleaning_durations.minutes(cleaning_type),
                now,
            )
            .with_deadline(deadline)
            .created_at(now)
            .with_impact(self.impact_at(restroom, t_idx));

            info!(task = %id, restroom = %restroom, waiting_time, priority, kind = %cleaning_type, "Urgent cleaning requested");
            self.tasks.push(task);
            created.push(self.tasks.len() - 1);
        }
        created
    }

    fn can_handle(&self, crew_idx: usize, task_idx: usize, now: f64) -> SimulationResult<bool> {
        let member = &self.crew[crew_idx];
        let task = &self.tasks[task_idx];
        let config = self.config();

        if task.cleaning_type == CleaningType::Emergency && !member.emergency_capable {
            return Ok(false);
        }
        let needed = config.supply_management.supplies_per_cleaning * task.cleaning_type.supply_factor();
        if member.supplies_remaining < needed {
            return Ok(false);
        }

        let travel = self.travel(&member.current_location, &LocationId::from(&task.restroom_id))?;
        let completion = now + travel + task.estimated_duration * 60.0;
        Ok(match task.deadline {
            None => true,
            Some(deadline) if completion <= deadline => true,
            Some(deadline) => task.is_high_priority() && completion <= deadline + config.scheduling.deadline_grace,
        })
    }

    fn score(&self, crew_idx: usize, task_idx: usize, now: f64) -> SimulationResult<f64> {
        let member = &self.crew[crew_idx];
        let task = &self.tasks[task_idx];
        let travel = self.travel(&member.current_location, &LocationId::from(&task.restroom_id))?;
        Ok(individual_score(member, task, travel, now, self.config().scheduling.urgency_bonus_window))
    }

    fn candidate(&self, crew_idx: usize, task_idx: usize, now: f64) -> SimulationResult<Candidate<usize>> {
        Ok(Candidate { key: crew_idx, score: self.score(crew_idx, task_idx, now)?, skill: self.crew[crew_idx].skill_level })
    }

    /// Staff an urgent task with a single crew member
    ///
    /// Idle crew go first. Priority 4 and 5 tasks then take the best available
    /// crew member who is not mid-task. Failing that, the crew member on the
    /// lowest-priority task below this one is pulled off. Returns `None` when
    /// nobody can take it.
    fn handle_urgent_task(&mut self, task_idx: usize, t_idx: usize, now: f64) -> SimulationResult<Option<CrewId>> {
        let task = &self.tasks[task_idx];
        let (task_id, priority) = (task.id, task.priority);

        let mut idle = Vec::new();
        let mut available = Vec::new();
        for i in 0..self.crew.len() {
            if !self.crew[i].is_available(now) || !self.can_handle(i, task_idx, now)? {
                continue;
            }
            let candidate = self.candidate(i, task_idx, now)?;
            if self.crew[i].status == CrewStatus::Idle {
                idle.push(candidate);
            }
            available.push(candidate);
        }

        if let Some(i) = best_team(&idle, 1).and_then(|team| team.first().copied()) {
            let crew_id = self.crew[i].id;
            self.execute(task_idx, &[crew_id], t_idx, now)?;
            return Ok(Some(crew_id));
        }

        // available crew are never mid-task, so busy crew are only reached by preemption below
        if priority >= 4 {
            if let Some(i) = best_team(&available, 1).and_then(|team| team.first().copied()) {
                let crew_id = self.crew[i].id;
                self.execute(task_idx, &[crew_id], t_idx, now)?;
                return Ok(Some(crew_id));
            }
        }

        let mut preemptable: Option<(usize, u8)> = None;
        for i in 0..self.crew.len() {
            let member = &self.crew[i];
            if !member.status.is_busy() || !member.is_on_shift(now) {
                continue;
            }
            let current = match member.current_task {
                Some(current) => current,
                None => continue,
            };
            let current_priority = self.tasks[self.task_index(current)?].priority;
            if current_priority >= priority || !self.can_handle(i, task_idx, now)? {
                continue;
            }
            if preemptable.map_or(true, |(_, lowest)| current_priority < lowest) {
                preemptable = Some((i, current_priority));
            }
        }

        if let Some((i, _)) = preemptable {
            let crew_id = self.crew[i].id;
            self.preempt(i, task_idx, t_idx, now)?;
            return Ok(Some(crew_id));
        }

        warn!(task = %task_id, restroom = %self.tasks[task_idx].restroom_id, priority, "No crew available for urgent task");
        Ok(None)
    }

    /// Pull a crew member off their current task and onto an urgent one
    ///
    /// A task left without crew has its required time deferred by the
    /// preemption window. Its deadline stays where it was.
    fn preempt(&mut self, crew_idx: usize, task_idx: usize, t_idx: usize, now: f64) -> SimulationResult<()> {
        let crew_id = self.crew[crew_idx].id;
        if let Some(old_id) = self.crew[crew_idx].current_task {
            let old_idx = self.task_index(old_id)?;
            let deferral = self.config().scheduling.preemption_deferral;

            let old = &mut self.tasks[old_idx];
            old.assigned_crew.retain(|&id| id != crew_id);
            if old.assigned_crew.is_empty() {
                old.required_time = now + deferral;
                old.was_preempted = true;
            }

            let event = self
                .schedules
                .get_mut(&crew_id)
                .and_then(|events| events.iter_mut().rev().find(|e| e.task_id == Some(old_id)));
            if let Some(event) = event {
                if event.end > now {
                    event.end = now;
                }
            }
            info!(crew = %crew_id, from = %old_id, to = %self.tasks[task_idx].id, "Crew member preempted");
        }

        self.execute(task_idx, &[crew_id], t_idx, now)
    }

    fn active_crew_at(&self, restroom: &RestroomId) -> usize {
        self.crew
            .iter()
            .filter(|c| c.status.is_busy())
            .filter_map(|c| c.current_task)
            .filter(|&id| self.tasks.iter().any(|t| t.id == id && t.restroom_id == *restroom))
            .count()
    }

    /// Plan crews for every pending task inside the lookahead window
    ///
    /// Tasks are taken by priority, then by time left to the deadline, then by
    /// passenger impact. Each crew member is planned at most once per batch.
    fn batch_assign(&self, now: f64) -> SimulationResult<Vec<(usize, Vec<CrewId>)>> {
        let lookahead = self.config().scheduling.lookahead;
        let mut pending: Vec<usize> = (0..self.tasks.len())
            .filter(|&i| self.tasks[i].is_pending() && self.tasks[i].required_time <= now + lookahead)
            .collect();
        if pending.is_empty() {
            return Ok(Vec::new());
        }

        let slack = |task: &CleaningTask| task.deadline.map_or(f64::INFINITY, |d| d - now);
        pending.sort_by(|&a, &b| {
            let (ta, tb) = (&self.tasks[a], &self.tasks[b]);
            tb.priority
                .cmp(&ta.priority)
                .then_with(|| slack(ta).total_cmp(&slack(tb)))
                .then_with(|| tb.passenger_impact.total_cmp(&ta.passenger_impact))
        });

        let mut available: Vec<usize> = (0..self.crew.len()).filter(|&i| self.crew[i].is_available(now)).collect();
        let mut planned: BTreeMap<RestroomId, usize> = BTreeMap::new();
        let mut plan = Vec::new();

        for task_idx in pending {
            if available.is_empty() {
                break;
            }
            let task = &self.tasks[task_idx];
            let capacity = self.optimizer.restrooms.get(&task.restroom_id).map_or(0.0, |r| r.total());
            let occupied =
                self.active_crew_at(&task.restroom_id) + planned.get(&task.restroom_id).copied().unwrap_or(0);
            let slots = max_cleaners(capacity).saturating_sub(occupied);
            if slots == 0 {
                continue;
            }

            let mut candidates = Vec::new();
            for &i in &available {
                if self.can_handle(i, task_idx, now)? {
                    candidates.push(self.candidate(i, task_idx, now)?);
                }
            }

            if let Some(team) = best_team(&candidates, target_team_size(task.priority, slots)) {
                available.retain(|i| !team.contains(i));
                *planned.entry(task.restroom_id.clone()).or_insert(0) += team.len();
                plan.push((task_idx, team.iter().map(|&i| self.crew[i].id).collect()));
            }
        }
        Ok(plan)
    }

    /// Send a team to a task
    ///
    /// All travel times are resolved before any state changes. Team work
    /// shortens the cleaning by a factor of `n^0.7`.
    fn execute(&mut self, task_idx: usize, team: &[CrewId], t_idx: usize, now: f64) -> SimulationResult<()> {
        let restroom = self.tasks[task_idx].restroom_id.clone();
        let location = LocationId::from(&restroom);

        let mut legs = Vec::with_capacity(team.len());
        for &crew_id in team {
            let i = self.crew_index(crew_id)?;
            legs.push((i, self.travel(&self.crew[i].current_location, &location)?));
        }

        let costs = &self.config().cost_parameters;
        let task_id = self.tasks[task_idx].id;
        let team_size = team.len() as f64;
        let adjusted_minutes = self.tasks[task_idx].estimated_duration / team_size.powf(0.7);

        for (i, travel) in legs {
            let end = now + travel + adjusted_minutes * 60.0;
            let member = &mut self.crew[i];
            member.status = if travel > 0.0 { CrewStatus::Traveling } else { CrewStatus::Cleaning };
            member.travel_end_time = now + travel;
            member.current_task_end_time = end;
            member.current_task = Some(task_id);
            member.current_location = location.clone();
            self.schedules.entry(member.id).or_default().push(ScheduleEvent {
                start: now,
                end,
                task_id: Some(task_id),
                restroom_id: Some(restroom.clone()),
                status: CrewStatus::Cleaning,
            });
        }

        let capacity_reduction = (team_size * costs.capacity_reduction_per_cleaner).min(1.0);
        let impact = self.impact_at(&restroom, t_idx);
        let task = &mut self.tasks[task_idx];
        task.assigned_crew = team.to_vec();
        task.capacity_reduction = capacity_reduction;
        task.disruption_cost += costs.disruption_multiplier * capacity_reduction * impact / 100.0;

        debug!(task = %task_id, restroom = %restroom, crew = team.len(), time = now, "Crew dispatched");
        Ok(())
    }

    fn into_results(self, final_kpis: KpiSnapshot, n_steps: usize) -> OptimizationResults {
        let inputs = self.kpi_inputs();
        let cost_breakdown = inputs.cost_breakdown();
        let crew_performance = inputs.crew_performance();
        let task_summary = inputs.task_summary();
        let tasks = self.tasks.iter().map(TaskRecord::from).collect();

        OptimizationResults {
            run_id: RunId::new(),
            kpi_timeline: self.kpi_timeline,
            crew_assignments: self.assignments,
            task_completions: self.completions,
            final_kpis,
            cost_breakdown,
            crew_performance,
            task_summary,
            tasks,
            crew_schedules: self.schedules,
            simulation_duration: self.optimizer.duration,
            simulation_dt: self.optimizer.dt,
            total_time_steps: n_steps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn optimizer(duration: f64) -> CleaningCrewOptimizer {
        let mut restrooms = BTreeMap::new();
        restrooms.insert(RestroomId::new("R1"), RestroomCapacity { floor: 1, capacity_m: 0.2, capacity_f: 0.2 });
        let mut travel = TravelTimeMatrix::new();
        for base in ["Base_1", "Base_2"] {
            travel.insert_symmetric(base, "R1", 60.0);
        }
        travel.insert_symmetric("Base_1", "Base_2", 90.0);
        CleaningCrewOptimizer::new(restrooms, travel, duration, 60.0, CrewConfig::default()).unwrap()
    }

    #[test]
    fn test_routine_tasks_spread_evenly() {
        let optimizer = optimizer(3600.0);
        let demand = DemandSnapshot::default();
        let mut run = OptimizationRun::new(&optimizer, &demand);
        run.schedule_routine_tasks(&[CleaningRequirement::new("R1", 3), CleaningRequirement::new("R9", 2)]);

        let required: Vec<f64> = run.tasks.iter().map(|t| t.required_time).collect();
        assert_eq!(required, vec![900.0, 1800.0, 2700.0]);
        assert_eq!(run.tasks[0].deadline, Some(2700.0));
        assert!(run.tasks.iter().all(|t| t.priority == 2 && t.created_time == 0.0));
    }

    #[test]
    fn test_step_count_rounds_up() {
        let optimizer = CleaningCrewOptimizer::new(
            optimizer(3600.0).restrooms().clone(),
            TravelTimeMatrix::new(),
            3630.0,
            60.0,
            CrewConfig::default(),
        )
        .unwrap();
        assert_eq!(optimizer.n_steps(), 61);
    }

    #[test]
    fn test_rejects_invalid_horizon() {
        let restrooms = optimizer(3600.0).restrooms().clone();
        let result = CleaningCrewOptimizer::new(restrooms, TravelTimeMatrix::new(), 30.0, 60.0, CrewConfig::default());
        assert!(matches!(result, Err(SimulationError::InvalidConfig(_))));
    }
}
