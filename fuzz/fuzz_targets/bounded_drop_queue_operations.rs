#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use ring_collections::BoundedDropQueue;
use std::collections::VecDeque;

#[derive(Arbitrary, Debug)]
struct Script {
    capacity: u8,
    ops: Vec<Op>,
}

#[derive(Arbitrary, Debug)]
enum Op {
    Push(u32),
    Pop,
    Len,
}

fn run(s: Script) {
    let queue = match BoundedDropQueue::new(s.capacity as usize) {
        Ok(q) => q,
        Err(_) => {
            assert_eq!(s.capacity, 0);
            return;
        }
    };
    let mut model: VecDeque<u32> = VecDeque::new();

    for op in s.ops.into_iter() {
        match op {
            Op::Push(x) => {
                let mut expected_discards = 0;
                while model.len() >= queue.capacity() {
                    model.pop_front();
                    expected_discards += 1;
                }
                model.push_back(x);
                assert_eq!(queue.push(x), expected_discards);
            }
            Op::Pop => assert_eq!(queue.pop(), model.pop_front()),
            Op::Len => assert_eq!(queue.len(), model.len()),
        }
        assert!(queue.len() <= queue.capacity());
    }
}

fuzz_target!(|s: Script| {
    run(s);
});
