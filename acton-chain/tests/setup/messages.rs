/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */
#![allow(unused)]

#[derive(Debug)]
pub struct Ping;

#[derive(Debug)]
pub struct Pong;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token(pub i32);

// asks the handler to run its own select again
#[derive(Debug)]
pub struct TryNestedSelect;

// asks the handler to add cases to its own select
#[derive(Debug)]
pub struct TryModify;

#[derive(Debug)]
pub struct Empty;
