//! Basic usage example for `OpaqueValue`.
//!
//! This example stores values of different types in the same kind of container, shows where
//! each value ends up being stored and demonstrates copying, moving and swapping containers.

use opaque_value::{OpaqueValue, cast, cast_into, downcast_ref};

#[derive(Clone, Debug)]
struct Reading {
    sensor: String,
    samples: [f32; 8],
}

fn main() {
    let mut number = OpaqueValue::from_value(42_i32);
    let mut reading = OpaqueValue::from_value(Reading {
        sensor: String::from("thermometer"),
        samples: [21.5; 8],
    });

    println!("number: {number:?}");
    println!("reading: {reading:?}");

    // Typed access requires naming the stored type again.
    let value = cast::<i32>(&number).expect("we know a number is stored");
    println!("The number is {value}");

    match cast::<f64>(&number) {
        Ok(_) => println!("Unexpectedly got an f64 out of an i32 container"),
        Err(e) => println!("Casting to the wrong type fails: {e}"),
    }

    if downcast_ref::<f64>(Some(&number)).is_none() {
        println!("Non-failing access to the wrong type returns None");
    }

    // Copying a container copies the held value.
    let copy = reading.clone();
    println!("Cloned reading: {copy:?}");

    // Swapping exchanges values of different types without cloning them.
    number.swap(&mut reading);
    println!(
        "After swap, number holds {} and reading holds {}",
        number.type_info(),
        reading.type_info()
    );

    // Moving out of a container leaves it empty.
    let moved = number.take();
    println!("After take, the source has a value: {}", number.has_value());

    let reading = cast_into::<Reading>(moved).expect("we know a reading is stored");
    println!(
        "Sensor {} reported {} samples, first {}",
        reading.sensor,
        reading.samples.len(),
        reading.samples.first().copied().unwrap_or_default()
    );

    number.reset();
    println!("After reset: {number:?}");
}
