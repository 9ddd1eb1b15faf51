// Copyright 2025 the Splitbench Authors
// SPDX-License-Identifier: Apache-2.0

//! Splitbench: a run editor for speedrun splits

fn main() -> anyhow::Result<()> {
    splitbench::run()
}
