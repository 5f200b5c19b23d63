use swell::agg::Aggregator;
use swell::agg::Sink;
use swell::chain::Chain;
use swell::chain::FarBackwardLink;
use swell::chain::FarForwardLink;
use swell::chain::Version;
use swell::delta::TextDelta;
use swell::key::KeyPair;

#[derive(Default)]
struct Stats {
    nodes: u64,
    backward: u64,
    reservations: u64,
    resolutions: u64,
}

impl Sink<TextDelta> for Stats {
    fn write_node(&mut self, _version: Version) {
        self.nodes += 1;
    }
    fn write_far_backward_link(&mut self, _version: Version, _link: &FarBackwardLink<TextDelta>) {
        self.backward += 1;
    }
    fn write_far_forward_link(&mut self, _version: Version, _link: &FarForwardLink) {
        self.reservations += 1;
    }
    fn rewrite_far_forward_link(
        &mut self,
        _version: Version,
        _old: &FarForwardLink,
        _new: &FarForwardLink,
    ) {
        self.resolutions += 1;
    }
}

fn main() {
    let authors: Vec<KeyPair> = (0..3).map(|_| KeyPair::generate()).collect();
    let versions = 5000u64;

    let mut chain = Chain::new();
    let mut agg = Aggregator::new(10, 3, Stats::default()).unwrap();
    agg.set_aggregate_by_author(true);

    let genesis = chain.begin(&authors[0], 0);
    agg.add_node(&mut chain, genesis);
    for v in 1..=versions {
        let author = &authors[(v / 1000) as usize % authors.len()];
        let delta = TextDelta::new().insert(format!("edit {} ", v).as_bytes());
        let version = chain.append(author, v, delta);
        agg.add_node(&mut chain, version);
    }
    agg.complete(&mut chain);

    println!("chain: {} versions, {} authors", chain.len(), authors.len());
    println!("sink:  {} nodes", agg.sink.nodes);
    println!("       {} backward links", agg.sink.backward);
    println!("       {} reservations, {} resolved", agg.sink.reservations, agg.sink.resolutions);

    let mut by_distance: Vec<(u64, u64)> = Vec::new();
    for v in 0..=versions {
        for link in &chain.node(v).unwrap().backward_links {
            match by_distance.iter_mut().find(|(d, _)| *d == link.distance) {
                Some((_, count)) => *count += 1,
                None => by_distance.push((link.distance, 1)),
            }
        }
    }
    by_distance.sort();
    println!("backward links by distance:");
    for (distance, count) in by_distance {
        println!("       {:>5} x distance {}", count, distance);
    }
}
