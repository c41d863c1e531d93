#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use ring_collections::RingBuffer;
use std::collections::VecDeque;

#[derive(Arbitrary, Debug)]
struct Script {
    requested_capacity: u8,
    ops: Vec<Op>,
}

#[derive(Arbitrary, Debug)]
enum Op {
    Insert(u32),
    Remove,
    TryRemove,
    Get(i16),
    GetMut(i16, u32),
    Grow,
    Clear,
    Iter,
    IterRev,
    Render,
}

const MAX_CAPACITY: usize = 1 << 12;

fn run(s: Script) {
    let mut rb = RingBuffer::new(s.requested_capacity as usize);
    let mut capacity = rb.capacity();
    let mut model: VecDeque<u32> = VecDeque::new();

    for op in s.ops.into_iter() {
        match op {
            Op::Insert(x) => {
                let expected = if model.len() == capacity {
                    model.pop_front()
                } else {
                    None
                };
                model.push_back(x);
                assert_eq!(rb.insert(x), expected);
            }
            Op::Remove => assert_eq!(rb.remove().ok(), model.pop_front()),
            Op::TryRemove => assert_eq!(rb.try_remove(), model.pop_front()),
            Op::Get(i) => {
                let i = i as isize;
                let len = model.len() as isize;
                let logical = if i < 0 { len + i } else { i };
                let expected = if logical >= 0 && logical < len {
                    model.get(logical as usize)
                } else {
                    None
                };
                assert_eq!(rb.get(i).ok(), expected);
            }
            Op::GetMut(i, x) => {
                let i = i as isize;
                let len = model.len() as isize;
                let logical = if i < 0 { len + i } else { i };
                match rb.get_mut(i) {
                    Ok(v) => {
                        *v = x;
                        model[logical as usize] = x;
                    }
                    Err(_) => assert!(logical < 0 || logical >= len),
                }
            }
            Op::Grow => {
                if capacity < MAX_CAPACITY {
                    rb.grow();
                    capacity *= 2;
                }
            }
            Op::Clear => {
                rb.clear();
                model.clear();
            }
            Op::Iter => assert!(rb.iter().eq(model.iter())),
            Op::IterRev => assert!(rb.iter().rev().eq(model.iter().rev())),
            Op::Render => {
                let _ = format!("{} {:X} {:?}", rb, rb, rb);
            }
        }
        assert_eq!(rb.len(), model.len());
        assert_eq!(rb.capacity(), capacity);
    }
}

fuzz_target!(|s: Script| {
    run(s);
});
