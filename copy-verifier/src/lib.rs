// Copyright (C) SAFIT. All rights reserved.
// Copyright (C) BABEC. All rights reserved.
// Copyright (C) THL A29 Limited, a Tencent company. All rights reserved.
//
// SPDX-License-Identifier: Apache-2.0

pub mod constant;
pub mod copy_circuit;
pub mod error;
pub mod table;
pub mod util;
pub mod witness;
