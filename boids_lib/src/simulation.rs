use rand::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing::{debug, trace};

use crate::{
    birdwatcher::{Birdwatcher, FlockStats, Frame},
    boid::Boid,
    error::BoidsError,
    field::{Calm, EnvironmentField},
    flock::Flock,
    math_helpers::Space,
    options::RunOptions,
    trail::TrailBuffer,
};

/// Owns a flock for the length of one run and drives it tick by tick.
pub struct Simulation<V: Space> {
    run_options: RunOptions,
    flock: Flock<V>,
    trail: TrailBuffer<V>,
    field: Box<dyn EnvironmentField<V>>,
    tick: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary<V: Space> {
    /// ticks completed over the simulation's lifetime
    pub ticks: u64,
    pub stats: FlockStats<V>,
}

impl<V: Space> Simulation<V> {
    /// Random flock, with wind when the options ask for it
    pub fn new(run_options: RunOptions) -> Result<Self, BoidsError> {
        let field: Box<dyn EnvironmentField<V>> = match run_options.wind {
            Some(wind) => Box::new(wind),
            None => Box::new(Calm),
        };

        Self::with_field(run_options, field)
    }

    /// Random flock in a custom environment
    pub fn with_field(
        run_options: RunOptions,
        field: Box<dyn EnvironmentField<V>>,
    ) -> Result<Self, BoidsError> {
        run_options.validate()?;

        let seed = run_options
            .seed
            .unwrap_or_else(|| rand::thread_rng().next_u64());
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let flock = Flock::new(&run_options, &mut rng)?;

        debug!(
            boids = run_options.init_boids,
            dimensions = V::DIM,
            seed,
            wind = run_options.wind.is_some(),
            "flock initialised"
        );

        Self::assemble(run_options, flock, field)
    }

    /// Runs a hand placed population, `init_boids` follows the population size
    pub fn from_boids(
        mut run_options: RunOptions,
        boids: Vec<Boid<V>>,
        field: Box<dyn EnvironmentField<V>>,
    ) -> Result<Self, BoidsError> {
        run_options.init_boids = boids.len();
        run_options.validate()?;

        Self::assemble(run_options, Flock::from_boids(boids), field)
    }

    fn assemble(
        run_options: RunOptions,
        flock: Flock<V>,
        field: Box<dyn EnvironmentField<V>>,
    ) -> Result<Self, BoidsError> {
        let trail = TrailBuffer::new(run_options.trail_len, flock.get_no_entities())?;

        Ok(Simulation {
            run_options,
            flock,
            trail,
            field,
            tick: 0,
        })
    }

    /// Advances the flock by one tick and records its trail, returns the new frame
    pub fn step(&mut self) -> Result<Frame<'_, V>, BoidsError> {
        let tick = self.tick;

        self.flock
            .update(self.field.as_ref(), &self.run_options, tick);
        self.trail.record_flock(tick, self.flock.view())?;
        self.tick += 1;

        trace!(tick, "tick complete");

        Ok(Frame {
            tick,
            boids: self.flock.view(),
            trail: self.trail.read_all(),
        })
    }

    /// Runs the remaining ticks, handing every frame to all the watchers
    pub fn run(
        &mut self,
        watchers: &mut [&mut dyn Birdwatcher<V>],
    ) -> Result<RunSummary<V>, BoidsError> {
        while !self.is_finished() {
            let frame = self.step()?;
            for watcher in watchers.iter_mut() {
                watcher.watch(&frame);
            }
        }

        watchers.iter_mut().for_each(|watcher| watcher.finish());

        let summary = self.summary();
        debug!(
            ticks = summary.ticks,
            mean_speed = summary.stats.mean_speed,
            mean_neighbours = summary.stats.mean_neighbours,
            "run finished"
        );

        Ok(summary)
    }

    pub fn is_finished(&self) -> bool {
        self.tick >= self.run_options.ticks
    }

    pub fn summary(&self) -> RunSummary<V> {
        RunSummary {
            ticks: self.tick,
            stats: self.stats(),
        }
    }

    pub fn stats(&self) -> FlockStats<V> {
        FlockStats::from_boids(self.flock.view(), self.run_options.sensory_distance)
    }

    /// The frame of the last completed tick, as [`Simulation::step`] handed it
    /// out, none before the first step
    pub fn frame(&self) -> Option<Frame<'_, V>> {
        let tick = self.tick.checked_sub(1)?;

        Some(Frame {
            tick,
            boids: self.flock.view(),
            trail: self.trail.read_all(),
        })
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn boids(&self) -> &[Boid<V>] {
        self.flock.view()
    }

    pub fn trail(&self) -> &TrailBuffer<V> {
        &self.trail
    }

    pub fn run_options(&self) -> &RunOptions {
        &self.run_options
    }

    /// Samples the simulation's environment, e.g. to draw it on a [`crate::field::lattice`]
    pub fn sample_field(&self, position: V, tick: u64) -> V {
        self.field.sample(position, tick)
    }
}

#[cfg(test)]
mod tests {
    use glam::{Vec2, Vec3};

    use super::Simulation;
    use crate::{
        birdwatcher::{Birdwatcher, Frame, Recorder},
        boid::Boid,
        error::BoidsError,
        field::{Calm, WindField},
        options::RunOptions,
    };

    fn small(ticks: u64) -> RunOptions {
        RunOptions {
            init_boids: 16,
            ticks,
            seed: Some(11),
            ..Default::default()
        }
    }

    #[derive(Default)]
    struct Counter {
        frames: u64,
        last_tick: Option<u64>,
        finished: bool,
    }

    impl Birdwatcher<Vec3> for Counter {
        fn watch(&mut self, frame: &Frame<'_, Vec3>) {
            self.frames += 1;
            self.last_tick = Some(frame.tick);
        }

        fn finish(&mut self) {
            self.finished = true;
        }
    }

    #[test]
    fn invalid_options_fail_early() {
        let res = Simulation::<Vec2>::new(RunOptions {
            trail_len: 0,
            ..small(5)
        });
        assert!(matches!(res, Err(BoidsError::InvalidOption { name: "trail_len", .. })));
    }

    #[test]
    fn run_stops_at_tick_count() {
        let mut sim = Simulation::<Vec3>::new(small(25)).unwrap();
        let mut counter = Counter::default();
        let mut recorder = Recorder::new(5);

        let mut watchers: [&mut dyn Birdwatcher<Vec3>; 2] = [&mut counter, &mut recorder];
        let summary = sim.run(&mut watchers).unwrap();

        assert_eq!(summary.ticks, 25);
        assert_eq!(counter.frames, 25);
        assert_eq!(counter.last_tick, Some(24));
        assert!(counter.finished);
        assert!(sim.is_finished());
        // ticks 0, 5, .., 20
        assert_eq!(recorder.data().len(), 5 * 16);

        // nothing left to run
        let mut watchers: [&mut dyn Birdwatcher<Vec3>; 1] = [&mut counter];
        let again = sim.run(&mut watchers).unwrap();
        assert_eq!(again.ticks, 25);
        assert_eq!(counter.frames, 25);
    }

    #[test]
    fn step_records_trail() {
        let mut sim = Simulation::<Vec2>::new(small(100)).unwrap();
        let frame = sim.step().unwrap();

        assert_eq!(frame.tick, 0);
        assert_eq!(frame.trail.latest_tick(), Some(0));
        assert_eq!(frame.trail.get(0, 3), Some(frame.boids[3].position));
        assert_eq!(sim.tick(), 1);
    }

    #[test]
    fn frame_matches_last_step() {
        let mut sim = Simulation::<Vec2>::new(small(10)).unwrap();
        assert!(sim.frame().is_none());
        assert_eq!(sim.boids().len(), 16);

        for _ in 0..3 {
            sim.step().unwrap();
        }
        let frame = sim.frame().unwrap();

        assert_eq!(frame.tick, 2);
        assert_eq!(frame.trail.latest_tick(), Some(frame.tick));
        assert_eq!(frame.boids, sim.boids());

        // a recorder fed from frame() samples the same tick step() reported
        let mut recorder = Recorder::new(2);
        recorder.watch(&frame);
        assert_eq!(recorder.data().len(), 16);
        assert!(recorder.data().iter().all(|row| row.time == 2));
    }

    #[test]
    fn from_boids_takes_population_size() {
        let boids = vec![
            Boid::new(0, Vec2::new(100., 100.), Vec2::ZERO),
            Boid::new(1, Vec2::new(110., 100.), Vec2::ZERO),
        ];
        let sim = Simulation::from_boids(small(1), boids, Box::new(Calm)).unwrap();

        assert_eq!(sim.run_options().init_boids, 2);
        assert_eq!(sim.trail().population(), 2);
    }

    #[test]
    fn wind_options_select_the_field() {
        let wind = WindField::new(0.2, 10, 0.05);
        let sim = Simulation::<Vec2>::new(RunOptions {
            wind: Some(wind),
            ..small(1)
        })
        .unwrap();
        let calm = Simulation::<Vec2>::new(small(1)).unwrap();

        let p = Vec2::new(50., 60.);
        assert_ne!(sim.sample_field(p, 0), Vec2::ZERO);
        assert_eq!(calm.sample_field(p, 0), Vec2::ZERO);
    }
}
