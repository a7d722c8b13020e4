mod interaction;
mod view;

const NODE_RADIUS: f32 = 5.0;
const NEIGHBOR_RADIUS: f32 = 7.0;
const FOCAL_RADIUS: f32 = 10.0;
const LABEL_HIT_RADIUS: f32 = 16.0;
