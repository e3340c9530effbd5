use crate::{boid::Boid, error::BoidsError, math_helpers::Space};

/// Fixed depth ring of past positions, one row of the whole flock per slot.
///
/// Tick `t` is written into slot `t % depth`, older ticks simply get overwritten.
/// Every entry remembers the tick that wrote it, an entry only counts while that
/// tick is the newest one its slot has seen.
#[derive(Debug, Clone)]
pub struct TrailBuffer<V: Space> {
    depth: usize,
    population: usize,
    /// slot major, `positions[slot * population + agent]`
    positions: Vec<V>,
    /// tick that wrote each entry, same layout as `positions`
    written: Vec<Option<u64>>,
    /// newest tick written into each slot
    slot_ticks: Vec<Option<u64>>,
    latest: Option<u64>,
}

impl<V: Space> TrailBuffer<V> {
    pub fn new(depth: usize, population: usize) -> Result<Self, BoidsError> {
        if depth == 0 {
            return Err(BoidsError::invalid("trail_len", "must hold at least one tick"));
        }

        Ok(TrailBuffer {
            depth,
            population,
            positions: vec![V::ZERO; depth * population],
            written: vec![None; depth * population],
            slot_ticks: vec![None; depth],
            latest: None,
        })
    }

    #[inline]
    pub fn slot(&self, tick: u64) -> usize {
        (tick % self.depth as u64) as usize
    }

    pub fn record(&mut self, tick: u64, agent_index: usize, position: V) -> Result<(), BoidsError> {
        if agent_index >= self.population {
            return Err(BoidsError::AgentOutOfRange {
                index: agent_index,
                population: self.population,
            });
        }

        let slot = self.slot(tick);
        self.write(slot, agent_index, tick, position);
        self.mark(slot, tick);

        Ok(())
    }

    /// Records the position of every boid for `tick`, agents past the end of
    /// `boids` are left absent for that tick
    pub fn record_flock(&mut self, tick: u64, boids: &[Boid<V>]) -> Result<(), BoidsError> {
        if boids.len() > self.population {
            return Err(BoidsError::AgentOutOfRange {
                index: boids.len() - 1,
                population: self.population,
            });
        }

        let slot = self.slot(tick);
        for (agent_index, boid) in boids.iter().enumerate() {
            self.write(slot, agent_index, tick, boid.position);
        }
        self.mark(slot, tick);

        Ok(())
    }

    #[inline]
    fn write(&mut self, slot: usize, agent_index: usize, tick: u64, position: V) {
        let idx = slot * self.population + agent_index;
        self.positions[idx] = position;
        self.written[idx] = Some(tick);
    }

    fn mark(&mut self, slot: usize, tick: u64) {
        let slot_tick = &mut self.slot_ticks[slot];
        *slot_tick = Some(slot_tick.map_or(tick, |t| t.max(tick)));
        self.latest = Some(self.latest.map_or(tick, |latest| latest.max(tick)));
    }

    /// Position of `agent_index` in `slot`, none unless it was recorded at the
    /// slot's current tick
    pub fn get(&self, slot: usize, agent_index: usize) -> Option<V> {
        if slot >= self.depth || agent_index >= self.population {
            return None;
        }
        self.entry(slot, agent_index)
    }

    fn entry(&self, slot: usize, agent_index: usize) -> Option<V> {
        let idx = slot * self.population + agent_index;
        match (self.slot_ticks[slot], self.written[idx]) {
            (Some(current), Some(tick)) if current == tick => Some(self.positions[idx]),
            _ => None,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn population(&self) -> usize {
        self.population
    }

    pub fn latest_tick(&self) -> Option<u64> {
        self.latest
    }

    pub fn read_all(&self) -> TrailView<'_, V> {
        TrailView { buffer: self }
    }
}

/// Read only view of a [`TrailBuffer`] for whoever draws the trails
#[derive(Debug, Clone, Copy)]
pub struct TrailView<'a, V: Space> {
    buffer: &'a TrailBuffer<V>,
}

/// One written slot of the ring
#[derive(Debug, Clone, Copy)]
pub struct TrailSlot<'a, V: Space> {
    pub slot: usize,
    /// tick the positions were recorded at
    pub tick: u64,
    /// ticks since the most recent record, 0 for the newest slot
    pub age: u64,
    buffer: &'a TrailBuffer<V>,
}

impl<'a, V: Space> TrailSlot<'a, V> {
    /// Position of one boid at this slot's tick
    pub fn get(&self, agent_index: usize) -> Option<V> {
        self.buffer.get(self.slot, agent_index)
    }

    /// Every boid of the flock by id, none where it wasn't recorded at `tick`
    pub fn positions(&self) -> impl Iterator<Item = Option<V>> + 'a {
        let (buffer, slot) = (self.buffer, self.slot);
        (0..buffer.population).map(move |agent_index| buffer.entry(slot, agent_index))
    }
}

impl<'a, V: Space> TrailView<'a, V> {
    pub fn depth(&self) -> usize {
        self.buffer.depth
    }

    pub fn latest_tick(&self) -> Option<u64> {
        self.buffer.latest
    }

    pub fn get(&self, slot: usize, agent_index: usize) -> Option<V> {
        self.buffer.get(slot, agent_index)
    }

    /// Written slots ordered from the oldest to the newest
    pub fn slots(&self) -> impl Iterator<Item = TrailSlot<'a, V>> + 'a {
        let buffer = self.buffer;
        let latest = buffer.latest.unwrap_or(0);
        let start = buffer.slot(latest) + 1;

        (0..buffer.depth)
            .map(move |offset| (start + offset) % buffer.depth)
            .filter_map(move |slot| {
                buffer.slot_ticks[slot].map(|tick| TrailSlot {
                    slot,
                    tick,
                    age: latest - tick,
                    buffer,
                })
            })
    }
}
